use scriptpilot::agent::{LoopState, StopReason};
use scriptpilot::security::SafetyGate;
use scriptpilot::session::Role;

use crate::loop_harness::{LoopHarness, Run, reply, script};

const INSPECT_CSV: &str = "import pandas as pd\ndf = pd.read_csv('nasdaq.csv')\nprint(df.head())";
const PLOT_CSV: &str = "import pandas as pd\n\
import matplotlib.pyplot as plt\n\
df = pd.read_csv('nasdaq.csv')\n\
df.plot(x='Date', y='Close')\n\
plt.savefig('nasdaq.png')\n\
print('Saved nasdaq.png')\n\
print('TASK COMPLETE')";

#[tokio::test]
async fn inspect_then_plot_reaches_done() {
    let mut h = LoopHarness::new(
        vec![script(INSPECT_CSV), script(PLOT_CSV)],
        vec![
            Run::Output("         Date    Close\n0  2024-01-02  14765.9\n1  2024-01-03  14592.2\n"),
            Run::Output("Saved nasdaq.png\nTASK COMPLETE\n"),
        ],
    );

    let outcome = h.run("inspect nasdaq.csv and plot the closing price").await.unwrap();

    assert_eq!(outcome.state, LoopState::Done);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.executions, 2);
    assert!(outcome.final_output.contains("Saved nasdaq.png"));

    // The plotting script was generated after the table came back.
    let turns = h.conversation.turns();
    let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::Observation,
            Role::Assistant,
            Role::Observation,
        ]
    );
    assert!(turns[2].content.contains("14765.9"));
    assert!(turns[3].content.contains("plt.savefig"));
}

#[tokio::test]
async fn unmatched_parenthesis_never_reaches_the_executor() {
    let mut h = LoopHarness::new(
        vec![script("print((1 + 2)"), script("print(3)\nprint('TASK COMPLETE')")],
        vec![Run::Output("3\nTASK COMPLETE\n")],
    );

    let outcome = h.run("add one and two").await.unwrap();

    assert!(outcome.is_done());
    assert_eq!(outcome.iterations, 2);
    assert_eq!(
        h.executor.executed(),
        vec!["print(3)\nprint('TASK COMPLETE')\n".to_string()]
    );

    let turns = h.conversation.turns();
    assert_eq!(turns[2].role, Role::Observation);
    assert!(turns[2].content.starts_with("SYNTAX ERROR: line 1"));
    // Still awaiting a script after the syntax error: no Executing phase in between.
    assert_eq!(
        h.hook.transitions().first(),
        Some(&(LoopState::AwaitingScript, LoopState::Executing))
    );
}

#[tokio::test]
async fn python2_print_is_a_syntax_error_not_a_runtime_fault() {
    let mut h = LoopHarness::new(
        vec![script("print 'hello'"), script("print('hello')\nprint('TASK COMPLETE')")],
        vec![Run::Output("hello\nTASK COMPLETE\n")],
    );

    let outcome = h.run("say hello").await.unwrap();

    assert!(outcome.is_done());
    assert_eq!(h.executor.executed().len(), 1);
    let observations = h.observations();
    assert!(observations[0].starts_with("SYNTAX ERROR: line 1"));
    assert!(observations[0].contains("Missing parentheses in call to 'print'"));
}

#[tokio::test]
async fn bulk_delete_request_is_refused() {
    let mut h = LoopHarness::new(
        vec![script("import os\nfor f in os.listdir('.'):\n    os.remove(f)")],
        vec![],
    );

    let outcome = h.run("delete all files recursively").await.unwrap();

    assert_eq!(outcome.state, LoopState::Aborted);
    assert_eq!(outcome.exit_code(), 1);
    let StopReason::Refused(reason) = &outcome.stop_reason else {
        panic!("unexpected stop reason: {:?}", outcome.stop_reason);
    };
    assert_eq!(reason, "The request asks to delete files in bulk.");
    assert_eq!(&outcome.final_output, reason);
    assert!(h.executor.executed().is_empty());
    assert!(h.observations()[0].starts_with("SCRIPT REFUSED:"));
}

#[tokio::test]
async fn dangerous_script_is_refused_for_harmless_request() {
    let mut h = LoopHarness::new(
        vec![script("import shutil\nshutil.rmtree('/')")],
        vec![],
    );

    let outcome = h.run("tidy up the temp folder").await.unwrap();

    assert!(matches!(outcome.stop_reason, StopReason::Refused(_)));
    assert_eq!(outcome.executions, 0);
    assert_eq!(h.provider.calls(), 1);
}

#[tokio::test]
async fn missing_file_fault_is_fed_back() {
    let mut h = LoopHarness::new(
        vec![
            script("print(open('missing.txt').read())"),
            script("import os\nprint(sorted(os.listdir('.')))\nprint('TASK COMPLETE')"),
        ],
        vec![
            Run::Fail(
                "Traceback (most recent call last):\n  File \"<string>\", line 1, in <module>\n\
FileNotFoundError: [Errno 2] No such file or directory: 'missing.txt'\n\
Process exited with status 1",
            ),
            Run::Output("[]\nTASK COMPLETE\n"),
        ],
    );

    let outcome = h.run("show me missing.txt").await.unwrap();

    assert!(outcome.is_done());
    let observations = h.observations();
    assert!(observations[0].starts_with("LAST SCRIPT FAILED:"));
    assert!(observations[0].contains("FileNotFoundError"));
    assert!(observations[1].starts_with("LAST SCRIPT OUTPUT:"));
}

#[tokio::test]
async fn empty_script_runs_and_loop_advances() {
    let mut h = LoopHarness::new(
        vec![reply("```python\n```"), script("print('TASK COMPLETE')")],
        vec![Run::Output(""), Run::Output("TASK COMPLETE\n")],
    );

    let outcome = h.run("do nothing first").await.unwrap();

    assert!(outcome.is_done());
    assert_eq!(h.executor.executed()[0], "");
    assert_eq!(h.observations()[0], "LAST SCRIPT OUTPUT:\n");
}

#[tokio::test]
async fn gate_can_be_disabled() {
    let mut h = LoopHarness::new(
        vec![script("import shutil\nshutil.rmtree('/')\nprint('TASK COMPLETE')")],
        vec![Run::Output("TASK COMPLETE\n")],
    );
    h.gate = SafetyGate::disabled();

    let outcome = h.run("delete all files").await.unwrap();

    assert!(outcome.is_done());
    assert_eq!(h.executor.executed().len(), 1);
}
