//! Screening for destructive device commands
//!
//! Every command goes through here before anything touches the wire.
//! A single match aborts the whole batch, so a typo in line 40 of a
//! command file cannot reload a core switch after 39 lines already ran.

/// Command prefixes that change or destroy device state.
///
/// Matching is by prefix over the normalized command, so trailing
/// arguments never hide a match (`reload in 5` is still `reload`).
/// Abbreviations operators actually type are listed as their own
/// entries and deliberately over-match: refusing a harmless `rel...`
/// is cheaper than reloading a device by accident.
const DENYLIST: &[&str] = &[
    // Reload
    "rel",
    "reload",
    // Write erase
    "wr er",
    "write er",
    "write erase",
    // Erase
    "era",
    "erase",
    // Delete
    "del",
    "delete",
];

/// The screen itself. Stateless; one instance vets any number of batches.
pub struct SafetyGate {
    denylist: &'static [&'static str],
}

/// Result of screening a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No denylist entry matched; the command may be transmitted.
    Pass,
    /// The command matched a denylist entry and must never be sent.
    Reject { pattern: &'static str },
}

/// A rejected command, with enough context to tell the operator
/// exactly which line of their batch tripped the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// The command as the operator wrote it.
    pub command: String,
    /// The denylist entry it matched.
    pub pattern: &'static str,
    /// Zero-based position in the submitted batch.
    pub position: usize,
}

/// A batch that has been screened in full. The only way to obtain one
/// is [`SafetyGate::vet`], and the transport layer only accepts this
/// type, so an unscreened command cannot reach a device by construction.
#[derive(Debug, Clone)]
pub struct VettedCommands(Vec<String>);

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyGate {
    pub fn new() -> Self {
        Self { denylist: DENYLIST }
    }

    /// Check if a command would change or destroy device state.
    pub fn is_destructive(&self, command: &str) -> bool {
        self.matched_pattern(command).is_some()
    }

    /// Screen a single command.
    pub fn check(&self, command: &str) -> Verdict {
        match self.matched_pattern(command) {
            Some(pattern) => Verdict::Reject { pattern },
            None => Verdict::Pass,
        }
    }

    /// Screen a whole batch. All commands are checked before any could
    /// be sent; the first match aborts with the offending line.
    pub fn vet(&self, commands: &[String]) -> Result<VettedCommands, Rejection> {
        for (position, command) in commands.iter().enumerate() {
            if let Verdict::Reject { pattern } = self.check(command) {
                return Err(Rejection {
                    command: command.clone(),
                    pattern,
                    position,
                });
            }
        }
        Ok(VettedCommands(commands.to_vec()))
    }

    fn matched_pattern(&self, command: &str) -> Option<&'static str> {
        let cmd = normalize(command);
        self.denylist.iter().copied().find(|p| cmd.starts_with(p))
    }
}

impl VettedCommands {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lowercase and collapse runs of whitespace so `"  Wr   Er "` and
/// `"wr er"` screen identically. Matching happens on this form only;
/// the command is transmitted exactly as written.
fn normalize(command: &str) -> String {
    command
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(commands: &[&str]) -> Vec<String> {
        commands.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_destructive_commands() {
        let gate = SafetyGate::new();

        assert!(gate.is_destructive("reload"));
        assert!(gate.is_destructive("rel"));
        assert!(gate.is_destructive("reload in 5"));
        assert!(gate.is_destructive("write erase"));
        assert!(gate.is_destructive("wr er"));
        assert!(gate.is_destructive("del flash:/*"));
        assert!(gate.is_destructive("delete system:running-config"));
        assert!(gate.is_destructive("erase startup-config"));
    }

    #[test]
    fn test_safe_commands() {
        let gate = SafetyGate::new();

        assert!(!gate.is_destructive("write mem"));
        assert!(!gate.is_destructive("write memory"));
        assert!(!gate.is_destructive("show version"));
        assert!(!gate.is_destructive("show running-config"));
        assert!(!gate.is_destructive("configure terminal"));
        assert!(!gate.is_destructive("copy running-config startup-config"));
    }

    #[test]
    fn test_normalization() {
        let gate = SafetyGate::new();

        // Case, leading/trailing space and interior runs all fold away
        assert!(gate.is_destructive("  RELOAD   in 5 "));
        assert!(gate.is_destructive("Wr   Er"));
        assert!(gate.is_destructive("\tDelete\tflash:vlan.dat"));

        // But the screen never rewrites what would be sent
        assert_eq!(normalize("  Wr   Er "), "wr er");
        assert_eq!(normalize("show version"), "show version");
    }

    #[test]
    fn test_prefix_not_substring() {
        let gate = SafetyGate::new();

        // Denylist words buried later in a command do not match
        assert!(!gate.is_destructive("show reload reason"));
        assert!(!gate.is_destructive("show ip route | include del"));
    }

    #[test]
    fn test_verdict_carries_pattern() {
        let gate = SafetyGate::new();

        assert_eq!(gate.check("show clock"), Verdict::Pass);
        // First entry in list order wins
        assert_eq!(
            gate.check("reload in 5"),
            Verdict::Reject { pattern: "rel" }
        );
        assert_eq!(
            gate.check("write erase"),
            Verdict::Reject { pattern: "write er" }
        );
        assert_eq!(gate.check("wr er"), Verdict::Reject { pattern: "wr er" });
    }

    #[test]
    fn test_vet_rejects_whole_batch() {
        let gate = SafetyGate::new();

        let commands = batch(&["show version", "show ip int brief", "reload in 5"]);
        let rejection = gate.vet(&commands).unwrap_err();
        assert_eq!(rejection.command, "reload in 5");
        assert_eq!(rejection.position, 2);
        assert_eq!(rejection.pattern, "rel");
    }

    #[test]
    fn test_vet_passes_clean_batch() {
        let gate = SafetyGate::new();

        let commands = batch(&["show version", "write mem"]);
        let vetted = gate.vet(&commands).unwrap();
        assert_eq!(vetted.len(), 2);
        let collected: Vec<&String> = vetted.iter().collect();
        assert_eq!(collected[0], "show version");
        assert_eq!(collected[1], "write mem");
    }

    #[test]
    fn test_vet_reports_first_match() {
        let gate = SafetyGate::new();

        let commands = batch(&["reload", "erase startup-config"]);
        let rejection = gate.vet(&commands).unwrap_err();
        assert_eq!(rejection.position, 0);
    }

    #[test]
    fn test_gate_is_stateless() {
        let gate = SafetyGate::new();

        // A rejection does not poison later checks
        assert!(gate.is_destructive("reload"));
        assert!(!gate.is_destructive("show version"));
        assert!(gate.vet(&batch(&["show clock"])).is_ok());
    }
}
