mod deposit;
mod events;
mod session;
mod sync;
mod utils;
