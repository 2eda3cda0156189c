use crate::config::{RuleConfig, RuleTarget};

fn rule(id: &str, reason: &str, target: RuleTarget, patterns: &[&str]) -> RuleConfig {
    RuleConfig {
        id: id.into(),
        reason: reason.into(),
        target,
        patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
    }
}

/// Built-in refusal rules. Ids are stable so users can disable them.
#[must_use]
pub fn default_rules() -> Vec<RuleConfig> {
    use RuleTarget::{Code, Request};

    vec![
        rule(
            "recursive-delete",
            "The script recursively deletes the filesystem root, the home directory, \
             the working directory or a wildcard.",
            Code,
            &[
                r#"(?m)\brm\s+-[a-zA-Z]*[rR][a-zA-Z]*\s+(?:-\S+\s+)*(?:/\*?|~/?\*?|\*|\./?\*?|\$HOME/?\*?)(?:[\s'"`;)]|$)"#,
            ],
        ),
        rule(
            "rmtree-broad",
            "The script removes the root, home or working directory tree.",
            Code,
            &[
                r#"shutil\.rmtree\(\s*(?:['"](?:/|~|~/|\.|\./)['"]|os\.getcwd\(\)|os\.path\.expanduser\(\s*['"]~/?['"]\s*\)|Path\.home\(\)|Path\.cwd\(\)|os\.environ\[\s*['"]HOME['"]\s*\])"#,
            ],
        ),
        rule(
            "walk-and-delete",
            "The script walks the root, home or working directory and deletes what it finds.",
            Code,
            &[
                r#"os\.walk\(\s*(?:['"](?:/|~|~/|\.|\./)['"]|os\.getcwd\(\)|os\.path\.expanduser\(\s*['"]~/?['"]\s*\)|Path\.home\(\))"#,
                r"os\.(?:remove|unlink)\(|\.unlink\(|shutil\.rmtree\(",
            ],
        ),
        rule(
            "disk-destroy",
            "The script formats or overwrites a disk or partition.",
            Code,
            &[
                r"\bmkfs(?:\.\w+)?\b|\bdd\s+[^\n]*\bof=/dev/|\bdiskutil\s+(?:erase\w*|zeroDisk|secureErase|partitionDisk)|\bwipefs\b",
            ],
        ),
        rule(
            "fork-bomb",
            "The script is a fork bomb.",
            Code,
            &[r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:"],
        ),
        rule(
            "fork-loop",
            "The script forks processes in an unbounded loop.",
            Code,
            &[r"while\s+(?:True|1)\s*:", r"os\.fork\(\)"],
        ),
        rule(
            "recursive-chmod-root",
            "The script recursively changes permissions or ownership of /.",
            Code,
            &[r#"(?m)\bch(?:mod|own)\s+-[a-zA-Z]*R[a-zA-Z]*\s+\S+\s+/(?:[\s'"`;]|$)"#],
        ),
        rule(
            "force-push",
            "The script force-pushes and can overwrite remote history.",
            Code,
            &[r"\bgit\s+push\b[^\n]*\s(?:--force(?:-with-lease)?\b|-f\b)"],
        ),
        rule(
            "power-off",
            "The script shuts down or reboots the machine.",
            Code,
            &[r#"(?m)(?:^|[\s'"`;\[])(?:shutdown|reboot|poweroff|halt)(?:\s+(?:-\w+|now|\+\d+)|['"`]\s*[,)\]])"#],
        ),
        rule(
            "drop-database",
            "The script drops a database, schema or table.",
            Code,
            &[r"(?i)\bdrop\s+(?:database|schema|table)\b"],
        ),
        rule(
            "sudo",
            "The script escalates privileges with sudo.",
            Code,
            &[r#"(?m)(?:^\s*|['"`;]\s*|&&\s*)sudo(?:\s|['"])"#],
        ),
        rule(
            "obfuscated-exec",
            "The script executes an encoded payload that cannot be inspected.",
            Code,
            &[
                r"\b(?:exec|eval)\s*\(",
                r"b64decode|b32decode|codecs\.decode|bytes\.fromhex|zlib\.decompress|marshal\.loads",
            ],
        ),
        rule(
            "bulk-delete-request",
            "The request asks to delete files in bulk.",
            Request,
            &[
                r"(?i)\b(?:delete|remove|erase|wipe|destroy|rm)\s+(?:all|every|everything|the\s+entire|my\s+entire)\b(?:\s+(?:my|the|of\s+my|of\s+the|of))?\s*(?:files?|folders?|director(?:y|ies)|data|contents|disk|drive|home|$)",
            ],
        ),
        rule(
            "wipe-disk-request",
            "The request asks to format or wipe a disk.",
            Request,
            &[r"(?i)\b(?:format|wipe|erase)\s+(?:the\s+|my\s+|this\s+)?(?:hard\s+|system\s+)?(?:disk|drive|partition|ssd)\b"],
        ),
        rule(
            "fork-bomb-request",
            "The request asks for a fork bomb.",
            Request,
            &[r"(?i)\bfork\s*bomb\b"],
        ),
    ]
}
