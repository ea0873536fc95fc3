use crate::domain::uri::Uri;

/// A JavaScript sandbox able to run a PAC script's `FindProxyForURL`. Not
/// required to be thread-safe on its own; the engine serializes access to
/// it behind its own mutex.
pub trait PacRuntime: Send {
    /// Compile and install `pac_bytes`. Returns false on a syntax error;
    /// the previously installed script (if any) is left untouched.
    fn set_pac(&mut self, pac_bytes: &[u8]) -> bool;

    /// Evaluate `FindProxyForURL(dest.to_string(), dest.host())`. Returns
    /// `""` on any runtime error, or if no script has been installed.
    fn run(&mut self, dest: &Uri) -> String;
}
