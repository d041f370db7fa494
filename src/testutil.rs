//! Scripted fakes shared by the unit tests
//!
//! Every pipeline step runs its tool invocations through [`ToolRunner`] and
//! its repository access through [`RepoBrowser`], so the fakes here are all
//! the tests need to exercise resolvers, the rewriter, the publisher and the
//! exporter without live tools or network.

use crate::core::error::VendorError;
use crate::security::{CommandError, ToolOutput, ToolRunner};
use crate::sources::github::{ContentEntry, RepoBrowser};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded tool invocation
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

type RunScript = Box<dyn Fn(&RecordedCall) -> Result<ToolOutput, CommandError> + Send + Sync>;

/// Tool runner that records every invocation and answers from a script
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    script: RunScript,
}

impl RecordingRunner {
    pub fn new(
        script: impl Fn(&RecordedCall) -> Result<ToolOutput, CommandError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Box::new(script),
        }
    }

    /// Every invocation succeeds with empty output
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ToolOutput::ok("")))
    }

    /// Every invocation succeeds and creates the given directories below the
    /// invocation's working directory, standing in for tool output trees
    pub fn seeding_dirs(dirs: Vec<String>) -> Self {
        Self::new(move |call| {
            for dir in &dirs {
                std::fs::create_dir_all(call.cwd.join(dir)).unwrap();
            }
            Ok(ToolOutput::ok(""))
        })
    }

    /// Invocations of `program` fail with the given stderr, everything else
    /// succeeds
    pub fn failing_on(program: &str, stderr: &str) -> Self {
        let program = program.to_string();
        let stderr = stderr.to_string();
        Self::new(move |call| {
            if call.program == program {
                Ok(ToolOutput {
                    success: false,
                    stdout: String::new(),
                    stderr: stderr.clone(),
                })
            } else {
                Ok(ToolOutput::ok(""))
            }
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<ToolOutput, CommandError> {
        let call = RecordedCall {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
        };
        self.calls.lock().unwrap().push(call.clone());
        (self.script)(&call)
    }
}

/// Repository browser answering from static maps
///
/// Directory listings are keyed `owner/repo/path@ref`; downloads are keyed by
/// URL. Anything not registered fails the way the real host would.
#[derive(Default)]
pub(crate) struct StaticBrowser {
    dirs: HashMap<String, Vec<ContentEntry>>,
    files: HashMap<String, Vec<u8>>,
    listed: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
}

impl StaticBrowser {
    pub fn add_dir(&mut self, key: &str, entries: Vec<(&str, Option<&str>)>) {
        let entries = entries
            .into_iter()
            .map(|(name, url)| ContentEntry {
                name: name.to_string(),
                download_url: url.map(|u| u.to_string()),
            })
            .collect();
        self.dirs.insert(key.to_string(), entries);
    }

    pub fn add_file(&mut self, url: &str, bytes: &[u8]) {
        self.files.insert(url.to_string(), bytes.to_vec());
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }

    pub fn listings(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoBrowser for StaticBrowser {
    async fn list_dir(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        reference: &str,
    ) -> Result<Vec<ContentEntry>, VendorError> {
        let key = format!("{owner}/{repo}/{path}@{reference}");
        self.listed.lock().unwrap().push(key.clone());
        self.dirs
            .get(&key)
            .cloned()
            .ok_or_else(|| VendorError::DirectoryListing {
                owner: owner.to_string(),
                repo: repo.to_string(),
                path: path.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, VendorError> {
        self.downloaded.lock().unwrap().push(url.to_string());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| VendorError::Download {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }
}
