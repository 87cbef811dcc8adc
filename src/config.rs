//! The preferences snapshot consumed by a decode call: plain data, loaded
//! once by the host and passed in rather than read from mutable globals, so
//! the decoder stays pure with respect to configuration. `(De)serialize` is
//! gated behind the optional `serde_support` feature, matching how this
//! crate's own config types are typically wired into a host's settings
//! store.

#[cfg_attr(feature = "serde_support", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn contains(&self, port: u16) -> bool {
        (self.start..=self.end).contains(&port)
    }
}

/// One `udp_message_types` row: a port range plus the message it maps to.
#[cfg_attr(feature = "serde_support", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpMessageType {
    pub ports: PortRange,
    pub message_full_name: std::string::String,
}

/// A schema search-path entry: directory plus whether to recursively load
/// every `.proto`/descriptor file it contains. The loader that walks these
/// paths lives outside this crate — this type only carries the preference
/// value through to wherever it's consulted.
#[cfg_attr(feature = "serde_support", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    pub path: std::path::PathBuf,
    pub load_all: bool,
}

#[cfg_attr(feature = "serde_support", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub search_paths: Vec<SearchPath>,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub udp_message_types: Vec<UdpMessageType>,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub try_dissect_as_string: bool,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub show_all_possible_field_types: bool,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub dissect_bytes_as_string: bool,
}

impl Config {
    /// First matching `udp_message_types` row wins: an inclusive port-range
    /// table, scanned in declaration order.
    pub fn message_type_for_udp_port(&self, port: u16) -> Option<&str> {
        self.udp_message_types
            .iter()
            .find(|entry| entry.ports.contains(port))
            .map(|entry| entry.message_full_name.as_str())
    }
}
