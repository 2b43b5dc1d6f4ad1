//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# chatstatus configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[connection]
# Relay host, without scheme. The client connects to
# wss://<server>/api/connect/<room>/<user>
server = "sechat.quickmediasolutions.com"
# ping_interval_seconds = 30     # 5-300, keepalive while connected
# retry_interval_seconds = 60    # 1-600, fixed delay between reconnects
# connect_timeout_seconds = 15   # 1-120

[preferences]
# debug = false                  # verbose frame logging
# show_self = true               # show your own read position
"##
    .to_string()
}
