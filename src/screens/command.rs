use std::path::PathBuf;

use crate::domain::post::PostId;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp {
        name: String,
        email: String,
        password: String,
    },
    Login {
        email: String,
        password: String,
    },
    Feed,
    Like {
        post_id: PostId,
    },
    Comment {
        post_id: PostId,
        text: String,
    },
    Post {
        body: String,
        image: Option<PathBuf>,
    },
    Profile(ProfileEdits),
    WhoAmI,
    Logout,
    Help,
    Quit,
}

/// Fields given on a `profile` line. Anything absent keeps its current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdits {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<PathBuf>,
}

pub const HELP: &str = "\
commands:
  signup <name> <email> <password>
  login <email> <password>
  feed
  like <post-id>
  comment <post-id> <text...>
  post [--image <path>] <body...>
  profile [name=..] [email=..] [bio=..] [address=..] [avatar=<path>]
  whoami
  logout
  help
  quit";

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match verb {
            "signup" => match args.as_slice() {
                [name, email, password] => Self::SignUp {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => return Err("usage: signup <name> <email> <password>".into()),
            },
            "login" => match args.as_slice() {
                [email, password] => Self::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => return Err("usage: login <email> <password>".into()),
            },
            "feed" | "home" => Self::Feed,
            "like" => match args.as_slice() {
                [post_id] => Self::Like {
                    post_id: parse_post_id(post_id)?,
                },
                _ => return Err("usage: like <post-id>".into()),
            },
            "comment" => match args.split_first() {
                Some((post_id, text)) if !text.is_empty() => Self::Comment {
                    post_id: parse_post_id(post_id)?,
                    text: text.join(" "),
                },
                _ => return Err("usage: comment <post-id> <text...>".into()),
            },
            "post" => parse_post(&args)?,
            "profile" => Self::Profile(parse_profile(&args)?),
            "whoami" => Self::WhoAmI,
            "logout" => Self::Logout,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command: {} (try `help`)", other)),
        };
        Ok(Some(command))
    }
}

fn parse_post_id(raw: &str) -> Result<PostId, String> {
    raw.parse::<PostId>()
        .map_err(|_| format!("invalid post id: {}", raw))
}

fn parse_post(args: &[&str]) -> Result<Command, String> {
    let (image, rest) = match args {
        ["--image", path, rest @ ..] => (Some(PathBuf::from(*path)), rest),
        ["--image"] => return Err("usage: post [--image <path>] <body...>".into()),
        rest => (None, rest),
    };
    Ok(Command::Post {
        body: rest.join(" "),
        image,
    })
}

fn parse_profile(args: &[&str]) -> Result<ProfileEdits, String> {
    let mut edits = ProfileEdits::default();
    let mut last_key: Option<&str> = None;

    for arg in args {
        if let Some(("avatar", value)) = arg.split_once('=') {
            edits.avatar = Some(PathBuf::from(value));
            last_key = None;
            continue;
        }
        if let Some((key, value)) = arg.split_once('=') {
            if let Some(field) = text_field(&mut edits, key) {
                *field = Some(value.to_string());
                last_key = Some(key);
                continue;
            }
        }

        // Words without a key continue the previous value, so
        // `bio=likes long walks` keeps its spaces.
        match last_key.and_then(|key| text_field(&mut edits, key)) {
            Some(Some(value)) => {
                value.push(' ');
                value.push_str(arg);
            }
            _ => return Err(format!("unexpected profile argument: {}", arg)),
        }
    }
    Ok(edits)
}

fn text_field<'a>(edits: &'a mut ProfileEdits, key: &str) -> Option<&'a mut Option<String>> {
    match key {
        "name" => Some(&mut edits.name),
        "email" => Some(&mut edits.email),
        "bio" => Some(&mut edits.bio),
        "address" => Some(&mut edits.address),
        _ => None,
    }
}
