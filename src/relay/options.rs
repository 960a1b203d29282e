//! # Relay instance options.
//!
//! Defines [`RelayOptions`], the immutable description of one desired
//! relay-process invocation: its ordered argument tokens and its declared
//! timeout.
//!
//! Options can be created:
//! - **Raw** with [`RelayOptions::from_args`] (any argument list)
//! - **Templated** with [`RelayOptions::stream_copy`] (the fixed
//!   low-latency stream-copy invocation, addresses filled in)
//!
//! ## Rules
//! - Options are immutable after construction; a record keeps the same
//!   options for the supervisor's lifetime.
//! - The declared timeout doubles as the health-check staleness
//!   threshold; `Duration::ZERO` means "no expectation" and the instance
//!   is never flagged.
//! - Two structurally identical options are still two independent
//!   instances — identity is the record's position in the table, never
//!   the option content.

use std::time::Duration;

/// Immutable description of one relay-process invocation.
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use relayvisor::RelayOptions;
///
/// let opts = RelayOptions::stream_copy(
///     "udp://10.0.0.1:5000",
///     "udp://10.0.0.2:6000",
///     Some(Duration::from_secs(5)),
/// );
/// assert_eq!(opts.timeout(), Duration::from_secs(5));
/// assert!(opts.arg_string().contains("udp://10.0.0.1:5000?timeout=5000000"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayOptions {
    args: Vec<String>,
    timeout: Duration,
}

impl RelayOptions {
    /// Creates options from a raw argument list.
    ///
    /// The declared timeout is zero ("no expectation"); use
    /// [`RelayOptions::with_timeout`] to declare one.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            timeout: Duration::ZERO,
        }
    }

    /// Creates options for a low-latency stream-copy relay between two
    /// addresses.
    ///
    /// Synthesizes the fixed argument template: no-buffering input flags,
    /// stream-copy video, MPEG transport-stream output framing, zero
    /// copy-timebase, zero-latency tuning, 1 MB probe size, and a fixed
    /// 1316-byte packet size on the output address.
    ///
    /// When `timeout` is non-zero it is also encoded into the input
    /// address as a `timeout=<microseconds>` query parameter, so the
    /// relay tool itself aborts the input after that duration.
    pub fn stream_copy(input: &str, output: &str, timeout: Option<Duration>) -> Self {
        let timeout = timeout.unwrap_or(Duration::ZERO);
        let input_arg = if timeout > Duration::ZERO {
            format!("{input}?timeout={}", timeout.as_micros())
        } else {
            input.to_string()
        };

        let args = vec![
            "-fflags".to_string(),
            "nobuffer".to_string(),
            "-i".to_string(),
            input_arg,
            "-c:v".to_string(),
            "copy".to_string(),
            "-f".to_string(),
            "mpegts".to_string(),
            "-copytb".to_string(),
            "0".to_string(),
            "-tune".to_string(),
            "zerolatency".to_string(),
            "-probesize".to_string(),
            "1M".to_string(),
            format!("{output}?pkt_size=1316"),
        ];

        Self { args, timeout }
    }

    /// Returns new options with the given declared timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the ordered argument tokens.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the declared timeout (`Duration::ZERO` if none).
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the flattened argument string: tokens joined by single
    /// spaces.
    ///
    /// Used for the health report and logs. Callers must ensure no token
    /// itself requires escaping; the process is spawned with the token
    /// vector, not through a shell.
    pub fn arg_string(&self) -> String {
        self.args.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_copy_template_token_order() {
        let opts = RelayOptions::stream_copy("udp://in:5000", "udp://out:6000", None);
        assert_eq!(
            opts.args(),
            &[
                "-fflags",
                "nobuffer",
                "-i",
                "udp://in:5000",
                "-c:v",
                "copy",
                "-f",
                "mpegts",
                "-copytb",
                "0",
                "-tune",
                "zerolatency",
                "-probesize",
                "1M",
                "udp://out:6000?pkt_size=1316",
            ]
        );
    }

    #[test]
    fn test_timeout_is_encoded_in_microseconds() {
        let opts = RelayOptions::stream_copy(
            "udp://in:5000",
            "udp://out:6000",
            Some(Duration::from_millis(1500)),
        );
        assert_eq!(opts.args()[3], "udp://in:5000?timeout=1500000");
        assert_eq!(opts.timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_zero_timeout_leaves_input_address_bare() {
        let opts =
            RelayOptions::stream_copy("udp://in:5000", "udp://out:6000", Some(Duration::ZERO));
        assert_eq!(opts.args()[3], "udp://in:5000");
        assert_eq!(opts.timeout(), Duration::ZERO);
    }

    #[test]
    fn test_arg_string_joins_with_single_spaces() {
        let opts = RelayOptions::from_args(["-i", "src", "dst"]);
        assert_eq!(opts.arg_string(), "-i src dst");
    }

    #[test]
    fn test_from_args_has_no_expectation() {
        let opts = RelayOptions::from_args(["30"]);
        assert_eq!(opts.timeout(), Duration::ZERO);
    }

    #[test]
    fn test_with_timeout_builder() {
        let opts = RelayOptions::from_args(["30"]).with_timeout(Duration::from_secs(5));
        assert_eq!(opts.timeout(), Duration::from_secs(5));
        assert_eq!(opts.arg_string(), "30");
    }

    #[test]
    fn test_identical_options_compare_equal_but_are_distinct_instances() {
        // Equality is structural; instance identity lives in the table
        // index, so equal options are fine to configure twice.
        let a = RelayOptions::stream_copy("udp://in:1", "udp://out:1", None);
        let b = RelayOptions::stream_copy("udp://in:1", "udp://out:1", None);
        assert_eq!(a, b);
    }
}
