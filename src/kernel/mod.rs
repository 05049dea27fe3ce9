pub mod action;
pub mod command;
pub mod compiler;
pub mod dispatcher;
pub mod event;
pub mod extract;
pub mod intent;
pub mod interpreter;
pub mod lexicon;
pub mod reactor;
pub mod telemetry;
pub mod time;
