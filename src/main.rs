use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linkup::app::session::Session;
use linkup::config::ClientConfig;
use linkup::screens::command::{Command, ProfileEdits, HELP};
use linkup::screens::handlers::{self, PostDraft, ProfileForm, SignUpForm};
use linkup::screens::{render, Alert};
use linkup::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    let state = AppState::from_config(&config)?;

    let mut session = match (
        std::env::var("LINKUP_EMAIL").ok(),
        std::env::var("LINKUP_PASSWORD").ok(),
    ) {
        (Some(email), Some(password)) => match handlers::login(&state, &email, &password).await {
            Ok((session, alert)) => {
                show(&alert);
                Some(session)
            }
            Err(alert) => {
                show(&alert);
                None
            }
        },
        _ => None,
    };

    println!("Welcome to LinkUp. Type `help` for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown_signal() => break,
        };
        let Some(line) = line else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        run(&state, &mut session, command).await;
    }

    tracing::info!("shell closed");
    Ok(())
}

async fn run(state: &AppState, session: &mut Option<Session>, command: Command) {
    match command {
        Command::Help => println!("{}", HELP),
        Command::SignUp {
            name,
            email,
            password,
        } => report(handlers::signup(state, SignUpForm { name, email, password }).await),
        Command::Login { email, password } => {
            match handlers::login(state, &email, &password).await {
                Ok((signed_in, alert)) => {
                    show(&alert);
                    *session = Some(signed_in);
                }
                Err(alert) => show(&alert),
            }
        }
        Command::Logout => match session.take() {
            Some(current) => report(handlers::logout(state, current).await),
            None => println!("Not signed in."),
        },
        Command::Quit => {}
        command => {
            let Some(current) = session.as_mut() else {
                println!("Please login to continue");
                return;
            };
            run_signed_in(state, current, command).await;
        }
    }
}

async fn run_signed_in(state: &AppState, session: &mut Session, command: Command) {
    match command {
        Command::Feed => match handlers::home_feed(state, session).await {
            Ok(feed) => print!("{}", render::FeedScreen(&feed)),
            Err(alert) => show(&alert),
        },
        Command::Like { post_id } => report(handlers::like_post(state, session, post_id).await),
        Command::Comment { post_id, text } => {
            report(handlers::add_comment(state, session, post_id, text).await)
        }
        Command::Post { body, image } => {
            let draft = match PostDraft::load(body, image.as_deref()).await {
                Ok(draft) => draft,
                Err(alert) => return show(&alert),
            };
            report(
                handlers::create_post(state, session, draft)
                    .await
                    .map(|(_, alert)| alert),
            )
        }
        Command::Profile(edits) => {
            let form = match profile_form(session, edits).await {
                Ok(form) => form,
                Err(alert) => return show(&alert),
            };
            report(handlers::save_profile(state, session, form).await)
        }
        Command::WhoAmI => {
            let avatar = state.storage.avatar(session.user().image.as_deref());
            let screen = render::ProfileScreen {
                user: session.user(),
                avatar: &avatar,
            };
            print!("{}", screen);
        }
        _ => {}
    }
}

async fn profile_form(session: &Session, edits: ProfileEdits) -> Result<ProfileForm, Alert> {
    let mut form = ProfileForm::from_session(session);
    if let Some(name) = edits.name {
        form.name = name;
    }
    if let Some(email) = edits.email {
        form.email = email;
    }
    if let Some(bio) = edits.bio {
        form.bio = bio;
    }
    if let Some(address) = edits.address {
        form.address = address;
    }
    if let Some(path) = edits.avatar {
        form.attach_avatar(&path).await?;
    }
    Ok(form)
}

fn report(result: Result<Alert, Alert>) {
    match result {
        Ok(alert) | Err(alert) => show(&alert),
    }
}

fn show(alert: &Alert) {
    println!("{}", alert);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
