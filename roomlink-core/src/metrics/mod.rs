/*
    Metrics - Counters for host session monitoring

    Provides counters for:
    - Command traffic (received, payload decode failures)
    - Pairing (join code rotations)
    - Presence (peer departures)
    - Relay traffic (remote control updates proxied)

    Recorded through the `metrics` facade; exporter wiring is left to the
    embedding application.
*/

use metrics::describe_counter;

/// Inbound commands received from remote peers
pub const COMMANDS_RECEIVED: &str = "roomlink_commands_received_total";

/// Inbound command payloads that failed to decode as JSON
pub const COMMAND_DECODE_FAILURES: &str = "roomlink_command_payload_decode_failures_total";

/// Join code rotations applied to the channel
pub const JOIN_CODE_ROTATIONS: &str = "roomlink_join_code_rotations_total";

/// Peers observed leaving the channel
pub const PEER_DEPARTURES: &str = "roomlink_peer_departures_total";

/// Remote control updates proxied toward remote peers
pub const UPDATES_RELAYED: &str = "roomlink_remote_control_updates_relayed_total";

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    describe_counter!(
        COMMANDS_RECEIVED,
        "Total number of commands received from remote peers"
    );

    describe_counter!(
        COMMAND_DECODE_FAILURES,
        "Total number of inbound command payloads that failed JSON decoding and were replaced with an empty payload"
    );

    describe_counter!(
        JOIN_CODE_ROTATIONS,
        "Total number of join code rotations applied to the channel lock"
    );

    describe_counter!(
        PEER_DEPARTURES,
        "Total number of remote peers observed becoming unavailable"
    );

    describe_counter!(
        UPDATES_RELAYED,
        "Total number of remote-control-update messages re-emitted toward remote peers"
    );
}
