//! Pipelined batch indexing.

use log::{debug, warn};
use redis::Value;

use crate::client::Client;
use crate::command::{Command, Transport};
use crate::document::{AddDocument, AddDocumentHash};
use crate::error::Result;

/// Queues add commands and sends them in one pipeline every `chunk_size`
/// documents.
///
/// Any documents still queued when the indexer is dropped are flushed; a
/// failure at that point can only be logged, so call
/// [`commit`](Self::commit) to observe it.
pub struct BatchIndexer<'a, T: Transport> {
    client: &'a mut Client<T>,
    pending: Vec<Command>,
    chunk_size: usize,
    total: usize,
}

impl<'a, T: Transport> BatchIndexer<'a, T> {
    pub(crate) fn new(client: &'a mut Client<T>, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        BatchIndexer {
            client,
            pending: Vec::with_capacity(chunk_size),
            chunk_size,
            total: 0,
        }
    }

    /// Queue a document, flushing if the chunk is full.
    pub fn add_document(&mut self, doc: &AddDocument) -> Result<()> {
        let command = self.client.add_document_command(doc);
        self.push(command)
    }

    /// Queue an existing hash, flushing if the chunk is full.
    pub fn add_document_hash(&mut self, doc: &AddDocumentHash) -> Result<()> {
        let command = self.client.add_document_hash_command(doc);
        self.push(command)
    }

    fn push(&mut self, command: Command) -> Result<()> {
        self.pending.push(command);
        self.total += 1;
        if self.pending.len() >= self.chunk_size {
            self.commit()?;
        }
        Ok(())
    }

    /// Send everything queued so far. The queue is cleared even if the
    /// pipeline fails.
    pub fn commit(&mut self) -> Result<Vec<Value>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }
        let commands = std::mem::take(&mut self.pending);
        debug!(
            "flushing {} documents to '{}'",
            commands.len(),
            self.client.index_name
        );
        self.client.transport.execute_pipeline(&commands)
    }

    /// Documents queued since the last flush.
    pub fn current_chunk(&self) -> usize {
        self.pending.len()
    }

    /// Documents queued over the indexer's lifetime.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<T: Transport> Drop for BatchIndexer<'_, T> {
    fn drop(&mut self) {
        let pending = self.pending.len();
        if let Err(err) = self.commit() {
            warn!("failed to flush {pending} queued documents: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RediSearchError;

    #[derive(Default)]
    struct PipelineRecorder {
        flushes: Vec<Vec<String>>,
        fail: bool,
    }

    impl Transport for PipelineRecorder {
        fn execute(&mut self, command: &Command) -> Result<Value> {
            self.flushes.push(vec![command.to_string()]);
            Ok(Value::Okay)
        }

        fn execute_pipeline(&mut self, commands: &[Command]) -> Result<Vec<Value>> {
            self.flushes
                .push(commands.iter().map(ToString::to_string).collect());
            if self.fail {
                return Err(RediSearchError::other("connection reset"));
            }
            Ok(vec![Value::Okay; commands.len()])
        }
    }

    #[test]
    fn test_flushes_every_chunk() {
        let mut client = Client::new("idx", PipelineRecorder::default());
        {
            let mut indexer = client.batch_indexer_with_chunk_size(2);
            for i in 0..5 {
                indexer
                    .add_document(&AddDocument::new(format!("doc{i}")).add_text("n", i.to_string()))
                    .unwrap();
            }
            assert_eq!(indexer.total(), 5);
            assert_eq!(indexer.current_chunk(), 1);
        }

        let flushes = &client.transport_mut().flushes;
        assert_eq!(flushes.len(), 3);
        assert_eq!(flushes[0].len(), 2);
        assert_eq!(flushes[2], vec!["FT.ADD idx doc4 1 FIELDS n 4"]);
    }

    #[test]
    fn test_explicit_commit_and_hash() {
        let mut client = Client::new("idx", PipelineRecorder::default());
        {
            let mut indexer = client.batch_indexer();
            assert_eq!(indexer.chunk_size(), 100);
            indexer
                .add_document_hash(&AddDocumentHash::new("h1").replace())
                .unwrap();
            let replies = indexer.commit().unwrap();
            assert_eq!(replies.len(), 1);
            assert_eq!(indexer.current_chunk(), 0);
            assert!(indexer.commit().unwrap().is_empty());
        }
        assert_eq!(
            client.transport_mut().flushes,
            vec![vec!["FT.ADDHASH idx h1 1 REPLACE".to_string()]]
        );
    }

    #[test]
    fn test_drop_swallows_flush_error() {
        let recorder = PipelineRecorder {
            fail: true,
            ..Default::default()
        };
        let mut client = Client::new("idx", recorder);
        {
            let mut indexer = client.batch_indexer();
            indexer.add_document(&AddDocument::new("doc1")).unwrap();
        }
        assert_eq!(client.transport_mut().flushes.len(), 1);
    }
}
