mod gatekeeper;
mod login;
mod ownership;
