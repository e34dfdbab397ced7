//! Chat session and RAG chat integration tests

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use toolrouter::error::Result;
use toolrouter::llm::{MockLlmClient, Role};
use toolrouter::rag::{ChatMemory, Embedder, MemoryVectorStore, Persona, RagChat};
use toolrouter::session::ChatSession;

/// Every text maps to the same direction, so every past message matches
struct FlatEmbedder;

#[async_trait]
impl Embedder for FlatEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.5, 0.5])
    }

    fn dimension(&self) -> usize {
        2
    }
}

#[tokio::test]
async fn test_session_replays_whole_history() -> Result<()> {
    let mock = MockLlmClient::new(vec!["r1", "r2", "r3", "r4"]);
    let mut session = ChatSession::new(&mock, "bye");
    let mut input = Cursor::new("m1\nm2\nm3\nm4\nBye\n");
    let mut out = Vec::new();

    session.run(&mut input, &mut out).await?;

    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 4);
    assert_eq!(
        prompts[3],
        "User: m1\nAI: r1\nUser: m2\nAI: r2\nUser: m3\nAI: r3\nUser: m4\nAI:"
    );
    for (n, prompt) in prompts.iter().enumerate() {
        assert_eq!(prompt.matches("User: ").count(), n + 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_rag_memory_survives_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("chat_memory.json");

    {
        let mock = Arc::new(MockLlmClient::new(vec!["Noted."]));
        let mut rag = RagChat::new(
            mock,
            Arc::new(FlatEmbedder),
            Arc::new(MemoryVectorStore::new()),
            ChatMemory::load(&path)?,
            Persona::new("Meet", "friendly"),
        );
        rag.turn("my favourite colour is green", |_| {}).await?;
    }

    let mock = Arc::new(MockLlmClient::new(vec!["Green!"]));
    let mut rag = RagChat::new(
        mock.clone(),
        Arc::new(FlatEmbedder),
        Arc::new(MemoryVectorStore::new()),
        ChatMemory::load(&path)?,
        Persona::new("Meet", "casual"),
    );
    let mut fragments = Vec::new();
    let reply = rag
        .turn("what is my favourite colour?", |f| fragments.push(f.to_string()))
        .await?;

    assert_eq!(reply, "Green!");
    assert_eq!(fragments.concat(), "Green!");

    let sent = &mock.chats()[0];
    assert_eq!(sent[0].content, "You are a helpful assistant talking to Meet in a casual tone.");
    assert_eq!(
        sent[1].content,
        "Relevant user context: \"my favourite colour is green\""
    );
    let history: Vec<_> = sent.iter().filter(|m| m.role != Role::System).collect();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].content, "Noted.");

    assert_eq!(ChatMemory::load(&path)?.len(), 4);
    Ok(())
}
