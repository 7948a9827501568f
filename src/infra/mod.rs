pub mod remote;
pub mod rest;
pub mod storage;
