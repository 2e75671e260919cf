mod commands;
mod stream;
