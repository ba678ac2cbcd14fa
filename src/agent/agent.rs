/// Node-side reporter. It only knows its own name; membership metadata
/// (roles, groups, leadership) lives with the dashboard, which is the
/// membership source of truth.
#[derive(Debug)]
pub struct Agent {
    pub server_name: String,
}

impl Agent {
    pub fn new(server_name: &str) -> Self {
        Agent {
            server_name: server_name.to_string(),
        }
    }
}
