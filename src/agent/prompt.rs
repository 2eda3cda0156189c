use crate::session::Turn;
use chrono::{Local, NaiveDate};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const EXAMPLE_SEPARATOR: &str = "-------------------------------------------------------------------------------";

/// Facts about the host that the model needs to write sensible scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub date: NaiveDate,
    pub cwd: PathBuf,
    pub in_git_repo: bool,
    pub os: String,
    pub terminal_marker: String,
}

impl PromptContext {
    pub fn gather(cwd: &Path, terminal_marker: &str) -> Self {
        Self {
            date: Local::now().date_naive(),
            cwd: cwd.to_path_buf(),
            in_git_repo: is_inside_git_repo(cwd),
            os: os_label().to_string(),
            terminal_marker: terminal_marker.to_string(),
        }
    }
}

fn is_inside_git_repo(cwd: &Path) -> bool {
    cwd.ancestors().any(|dir| dir.join(".git").exists())
}

fn os_label() -> &'static str {
    match std::env::consts::OS {
        "macos" => "Darwin",
        "linux" => "Linux",
        "windows" => "Windows",
        other => other,
    }
}

/// The system turns that open every conversation.
pub fn system_turns(ctx: &PromptContext) -> Vec<Turn> {
    vec![
        Turn::system(instructions(&ctx.terminal_marker)),
        Turn::system(examples(&ctx.terminal_marker)),
        Turn::system(environment_facts(ctx)),
    ]
}

fn instructions(marker: &str) -> String {
    format!(
        "You are a command-line assistant that completes tasks by writing Python scripts. \
The scripts you write are run immediately on the user's machine, and whatever they print is sent back to you.

How a session works:
1. The user asks for something.
2. You reply with a Python script that either does the task or gathers what you need to do it.
3. The script is run and its output comes back to you as \"LAST SCRIPT OUTPUT:\" followed by what it printed.
4. If the task is done, the script must print \"{marker}\". Otherwise keep going: write the next script based on what you learned.

Rules:
- Refuse anything that could cause serious harm to the user or their machine. Print the refusal from the script and finish with \"{marker}\".
- Report what you did in a short human-readable summary printed by the script. Do not dump raw data unless it was asked for.
- If the request is ambiguous, print a clarifying question and finish with \"{marker}\".
- Remove any temporary files you create.
- Leave hidden files and directories alone unless they are named in the request.
- Put the script inside exactly one pair of ``` delimiters. Text outside the delimiters is ignored."
    )
}

fn examples(marker: &str) -> String {
    let mut out = String::from("EXAMPLES:\n");
    let exchanges = [
        (
            "Stop whatever is listening on port 8000",
            format!(
                "```\nimport subprocess\n\
result = subprocess.run([\"lsof\", \"-ti\", \"tcp:8000\"], capture_output=True, text=True)\n\
pids = result.stdout.split()\n\
for pid in pids:\n    subprocess.run([\"kill\", pid])\n\
print(f\"Stopped {{len(pids)}} process(es) on port 8000\")\n\
print(\"{marker}\")\n```"
            ),
            None,
        ),
        (
            "Add today's date to the name of every .png in this folder",
            format!(
                "```\nimport os\nfrom datetime import date\n\n\
stamp = date.today().isoformat()\n\
renamed = 0\n\
for name in sorted(os.listdir(\".\")):\n    \
if name.lower().endswith(\".png\") and not name.startswith(\".\"):\n        \
base, ext = os.path.splitext(name)\n        \
os.rename(name, f\"{{base}}-{{stamp}}{{ext}}\")\n        \
renamed += 1\n\
print(f\"Renamed {{renamed}} file(s)\")\n\
print(\"{marker}\")\n```"
            ),
            None,
        ),
        (
            "What is notes.md about?",
            "```\nwith open(\"notes.md\") as f:\n    print(f.read())\n```".to_string(),
            Some((
                "LAST SCRIPT OUTPUT:\n# Trip plan\nFly to Lisbon on the 3rd, train to Porto on the 6th, back home on the 9th.",
                format!(
                    "```\nprint(\"notes.md is a short travel plan: Lisbon on the 3rd, Porto on the 6th, home on the 9th.\")\n\
print(\"{marker}\")\n```"
                ),
            )),
        ),
    ];

    for (request, first_script, follow_up) in exchanges {
        let _ = writeln!(out, "{EXAMPLE_SEPARATOR}");
        let _ = writeln!(out, "User: {request}");
        let _ = writeln!(out, "Assistant:\n{first_script}");
        if let Some((observation, second_script)) = follow_up {
            let _ = writeln!(out, "User:\n{observation}");
            let _ = writeln!(out, "Assistant:\n{second_script}");
        }
    }
    out.push_str(EXAMPLE_SEPARATOR);
    out
}

fn environment_facts(ctx: &PromptContext) -> String {
    let git = if ctx.in_git_repo {
        "which is inside a git repository"
    } else {
        "which is NOT a git repository"
    };
    format!(
        "Today's date is {}.\nThe current working directory is {}, {git}.\nThe user's operating system is {}.",
        ctx.date.format("%Y-%m-%d"),
        ctx.cwd.display(),
        ctx.os
    )
}
