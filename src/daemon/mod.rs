//
//  mod.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

pub mod protocol;
pub mod server;

pub use protocol::{Request, Response};
pub use server::{is_daemon_running, send_request, start_daemon};
