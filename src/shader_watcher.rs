use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use log::*;
use notify::{Event, RecursiveMode, Watcher};

pub struct ShaderChanges {
    #[expect(unused)]
    watcher: notify::RecommendedWatcher,
    receiver: mpsc::Receiver<notify::Result<Event>>,
    /// file names written by the generator itself
    ignored_file_names: Vec<OsString>,
}

impl ShaderChanges {
    /// Blocks until at least one relevant source edit arrives,
    /// then returns it along with anything else already queued.
    pub fn wait_for_changes(&mut self) -> anyhow::Result<Vec<notify::Event>> {
        loop {
            let first = self.receiver.recv()?;
            let events: notify::Result<Vec<notify::Event>> = std::iter::once(first)
                .chain(self.receiver.try_iter())
                .collect();
            let mut events = events?;

            events.retain(|event| self.is_source_edit(event));

            if !events.is_empty() {
                return Ok(events);
            }
        }
    }

    fn is_source_edit(&self, event: &Event) -> bool {
        let relevant_kind = match event.kind {
            notify::EventKind::Create(_) => true,
            notify::EventKind::Modify(_) => true,
            notify::EventKind::Remove(_) => true,

            notify::EventKind::Access(_) => false,
            notify::EventKind::Any => {
                debug!("unexpected notify event: {event:?}");
                false
            }
            notify::EventKind::Other => {
                debug!("unexpected notify event: {event:?}");
                false
            }
        };

        relevant_kind
            && event.paths.iter().any(|path| {
                path.file_name()
                    .is_some_and(|name| !self.ignored_file_names.iter().any(|i| i == name))
            })
    }
}

/// Watches every directory the input can pull source from.
/// Events for `ignored` outputs are dropped so a rewrite doesn't retrigger itself.
pub fn watch(
    input_path: &Path,
    include_dirs: &[PathBuf],
    ignored: &[&Path],
) -> notify::Result<ShaderChanges> {
    let (sender, receiver) = mpsc::channel::<notify::Result<Event>>();

    let mut watcher = notify::recommended_watcher(sender)?;

    let input_dir = match input_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher.watch(input_dir, RecursiveMode::Recursive)?;
    for include_dir in include_dirs {
        watcher.watch(include_dir, RecursiveMode::Recursive)?;
    }

    let mut ignored_file_names = vec![];
    for path in ignored {
        if let Some(file_name) = path.file_name() {
            let mut tmp_name = file_name.to_os_string();
            tmp_name.push(".tmp");
            ignored_file_names.push(file_name.to_os_string());
            ignored_file_names.push(tmp_name);
        }
    }

    info!("watching {} for changes", input_dir.display());

    Ok(ShaderChanges {
        watcher,
        receiver,
        ignored_file_names,
    })
}
