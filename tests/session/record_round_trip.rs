use scriptpilot::session::{Conversation, Role, SessionRecord, Turn};
use scriptpilot::usage::Cost;
use tempfile::TempDir;

fn finished_session() -> Conversation {
    let mut conversation = Conversation::new("openai/gpt-4-turbo-preview");
    conversation.append(Turn::system("You write Python scripts."));
    conversation.append(Turn::user("inspect nasdaq.csv"));
    conversation.append(Turn::assistant("```\nimport pandas as pd\nprint(pd.read_csv('nasdaq.csv').head())\n```"));
    conversation.append(Turn::observation("LAST SCRIPT OUTPUT:\n   Date  Close\n0  ...\n"));
    conversation.add_cost(Cost::from_micros(12_345));
    conversation
}

#[test]
fn saved_record_loads_back_identically() {
    let tmp = TempDir::new().unwrap();
    let conversation = finished_session();
    let record = SessionRecord::from_conversation(&conversation);

    let path = record.save_in(&tmp.path().join("logs")).unwrap();
    assert_eq!(path.file_name().unwrap().to_string_lossy(), record.file_name());

    let loaded = SessionRecord::load(&path).unwrap();
    assert_eq!(loaded, record);

    let restored = loaded.into_conversation();
    assert_eq!(restored.turns(), conversation.turns());
    assert_eq!(restored.metadata(), conversation.metadata());
    assert_eq!(restored.last().map(|t| t.role), Some(Role::Observation));
}

#[test]
fn same_second_sessions_do_not_overwrite_each_other() {
    let tmp = TempDir::new().unwrap();
    let record = SessionRecord::from_conversation(&finished_session());

    let first = record.save_in(tmp.path()).unwrap();
    let second = record.save_in(tmp.path()).unwrap();

    assert_ne!(first, second);
    assert!(first.exists() && second.exists());
}
