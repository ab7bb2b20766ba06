/// Connection state.
pub enum State {
    /// Link is down.
    Disconnected = 0,
    /// Link is up.
    Connected,
}

pub struct Status {
    /// Connected flag.
    pub connected: bool,
    /// Current state.
    pub state: State,
}
