pub struct Info {
    /// Packet loss percentage.
    pub packet_loss: u32,
    /// Round trip time in ms.
    pub round_trip_time: u64,
}
