#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use folder_upload_core::{ObjectStore, StoreError};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// In-memory store that records every put and how many were running at once.
#[derive(Default)]
pub struct RecordingStore {
    puts: Mutex<HashMap<String, usize>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    buckets: Mutex<BTreeSet<String>>,
    fail_keys: HashSet<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every put open for `delay` so overlapping calls become observable.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Reject puts for `key` after reading the body.
    pub fn failing_on(mut self, key: &str) -> Self {
        self.fail_keys.insert(key.to_string());
        self
    }

    pub fn put_counts(&self) -> HashMap<String, usize> {
        self.puts.lock().unwrap().clone()
    }

    pub fn total_puts(&self) -> usize {
        self.puts.lock().unwrap().values().sum()
    }

    pub fn stored_keys(&self) -> BTreeSet<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn buckets(&self) -> BTreeSet<String> {
        self.buckets.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, bucket: &str, key: &str, mut body: File) -> Result<(), StoreError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        *self.puts.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.buckets.lock().unwrap().insert(bucket.to_string());

        let mut contents = Vec::new();
        let read = body.read_to_end(&mut contents).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        read?;
        if self.fail_keys.contains(key) {
            return Err(format!("injected failure for {key}").into());
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), contents);
        Ok(())
    }
}

/// Create `relative` under `root` (parents included) with `contents`.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Lay out a small project tree with every kind of excluded entry in it.
///
/// Returns the keys expected under the prefix `site`.
pub fn build_site_tree(root: &Path) -> BTreeSet<String> {
    write_file(root, "index.html", "<html></html>");
    write_file(root, ".DS_Store", "junk");
    write_file(root, ".env", "SECRET=1");
    write_file(root, "css/site.css", "body {}");
    write_file(root, "css/.DS_Store", "junk");
    write_file(root, "js/vendor/lib.js", "var x;");
    write_file(root, "__pycache__/build.cpython-311.pyc", "bytecode");
    write_file(root, "tools/__pycache__/gen.cpython-311.pyc", "bytecode");
    write_file(root, "tools/gen.py", "print('hi')");
    write_file(root, ".venv/lib/site.py", "import os");
    write_file(root, "virtualenv/bin/activate", "#!/bin/sh");

    [
        "site/index.html",
        "site/.env",
        "site/css/site.css",
        "site/js/vendor/lib.js",
        "site/tools/gen.py",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
