mod common;

mod preview;
mod routing;
