//! Linux signal numbers, used to annotate `128 + N` exit codes.

pub const SIGKILL: i32 = 9;

const SIGNALS: &[(i32, &str)] = &[
    (1, "SIGHUP"),
    (2, "SIGINT"),
    (3, "SIGQUIT"),
    (4, "SIGILL"),
    (5, "SIGTRAP"),
    (6, "SIGABRT"),
    (7, "SIGBUS"),
    (8, "SIGFPE"),
    (SIGKILL, "SIGKILL"),
    (10, "SIGUSR1"),
    (11, "SIGSEGV"),
    (12, "SIGUSR2"),
    (13, "SIGPIPE"),
    (14, "SIGALRM"),
    (15, "SIGTERM"),
    (16, "SIGSTKFLT"),
    (17, "SIGCHLD"),
    (18, "SIGCONT"),
    (19, "SIGSTOP"),
    (20, "SIGTSTP"),
    (21, "SIGTTIN"),
    (22, "SIGTTOU"),
    (23, "SIGURG"),
    (24, "SIGXCPU"),
    (25, "SIGXFSZ"),
    (26, "SIGVTALRM"),
    (27, "SIGPROF"),
    (28, "SIGWINCH"),
    (29, "SIGIO"),
    (30, "SIGPWR"),
    (31, "SIGSYS"),
    (34, "SIGRTMIN"),
    (64, "SIGRTMAX"),
];

/// Name of signal `number`, if it is one the kernel defines by name.
pub fn signal_name(number: i32) -> Option<&'static str> {
    SIGNALS
        .iter()
        .find(|(n, _)| *n == number)
        .map(|(_, name)| *name)
}

/// Name of the signal that killed a process exiting with `returncode`
/// (shells report death by signal N as `128 + N`).
pub fn signal_for_returncode(returncode: i32) -> Option<&'static str> {
    returncode.checked_sub(128).and_then(signal_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_signals_resolve() {
        assert_eq!(signal_name(9), Some("SIGKILL"));
        assert_eq!(signal_name(11), Some("SIGSEGV"));
        assert_eq!(signal_name(64), Some("SIGRTMAX"));
    }

    #[test]
    fn gaps_and_out_of_range_are_unknown() {
        assert_eq!(signal_name(0), None);
        assert_eq!(signal_name(32), None);
        assert_eq!(signal_name(-1), None);
        assert_eq!(signal_name(65), None);
    }

    #[test]
    fn returncode_offsets_by_128() {
        assert_eq!(signal_for_returncode(139), Some("SIGSEGV"));
        assert_eq!(signal_for_returncode(1), None);
        assert_eq!(signal_for_returncode(128), None);
        assert_eq!(signal_for_returncode(i32::MIN), None);
    }
}
