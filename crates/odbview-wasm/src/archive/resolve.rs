//! Locating the steps/layers tree and the board profile inside an archive.
//!
//! Exporters disagree on the root (`odb/`, `data/`, none), on the case of
//! names, and on whether directory entries are listed at all. Every lookup
//! here therefore works over synthesized directories and degrades to `None`
//! or an empty list instead of failing.

use std::collections::HashSet;

use tracing::debug;

use super::ArchiveView;

/// File-name keywords identifying feature files inside a layer directory.
pub const LAYER_FILE_KEYWORDS: [&str; 7] = ["features", "feat", "geometry", "data", "xml", "json", "txt"];

const STEPS_HINTS: [&str; 3] = ["steps", "odb/steps", "data/steps"];

const PROFILE_PATHS: [&str; 6] = [
    "odb/steps/pcb/profile",
    "steps/pcb/profile",
    "data/steps/pcb/profile",
    "odb/steps/pcb/Profile",
    "steps/pcb/Profile",
    "data/steps/pcb/Profile",
];

const PROFILE_SEARCH_DIRS: [&str; 6] = [
    "odb/steps/pcb/",
    "steps/pcb/",
    "data/steps/pcb/",
    "odb/steps/",
    "steps/",
    "data/steps/",
];

/// Result of the steps → step → layers search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDirectories {
    /// The directory whose children are layer directories.
    pub layers_dir: String,
    /// One entry per layer, in discovery order.
    pub layer_dirs: Vec<String>,
}

/// Every directory in the archive: explicit directory entries first, then
/// every proper prefix of every path. Deduplicated, discovery order kept.
pub fn directories(view: &dyn ArchiveView) -> Vec<String> {
    let paths = view.list_paths();
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for path in &paths {
        if (view.is_directory(path) || path.ends_with('/')) && seen.insert(path.clone()) {
            dirs.push(path.clone());
        }
    }

    for path in &paths {
        let mut prefix = String::new();
        let mut segments = path.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                break;
            }
            prefix.push_str(segment);
            prefix.push('/');
            if seen.insert(prefix.clone()) {
                dirs.push(prefix.clone());
            }
        }
    }

    dirs
}

/// Finds the directory best matching `hint`.
///
/// The exact path is always tried. With `partial`, a case-insensitive
/// suffix match follows, then a substring match, then any directory whose
/// final segment equals the hint's final segment.
pub fn find_directory(view: &dyn ArchiveView, hint: &str, partial: bool) -> Option<String> {
    let normalized = hint.replace('\\', "/");
    let wanted = with_trailing_slash(&normalized);
    let dirs = directories(view);

    if let Some(exact) = dirs.iter().find(|dir| **dir == wanted) {
        return Some(exact.clone());
    }
    if !partial {
        return None;
    }

    let wanted_lower = wanted.to_lowercase();
    if let Some(dir) = dirs.iter().find(|dir| dir.to_lowercase().ends_with(&wanted_lower)) {
        return Some(dir.clone());
    }
    if let Some(dir) = dirs.iter().find(|dir| dir.to_lowercase().contains(&wanted_lower)) {
        return Some(dir.clone());
    }

    let last = last_segment(&normalized)?;
    dirs.into_iter()
        .find(|dir| last_segment(dir).is_some_and(|segment| segment.eq_ignore_ascii_case(last)))
}

/// Immediate subdirectories of `dir`, as `dir/<segment>/` paths.
///
/// Files directly inside `dir` count too when other entries nest below
/// them; a plain file name with nothing under it is not a directory.
pub fn list_subdirectories(view: &dyn ArchiveView, dir: &str) -> Vec<String> {
    let base = with_trailing_slash(dir);
    let mut seen = HashSet::new();
    let mut subdirs = Vec::new();

    for path in view.list_paths() {
        let Some(relative) = path.strip_prefix(&base) else {
            continue;
        };
        let Some((first, _)) = relative.split_once('/') else {
            continue;
        };
        if first.is_empty() {
            continue;
        }
        let subdir = format!("{base}{first}/");
        if seen.insert(subdir.clone()) {
            subdirs.push(subdir);
        }
    }

    subdirs
}

/// Files under `dir` whose relative path contains one of `keywords`.
///
/// Falls back to every file under `dir`, then to every file anywhere whose
/// path contains the directory's last segment.
pub fn find_files_in_directory(view: &dyn ArchiveView, dir: &str, keywords: &[&str]) -> Vec<String> {
    let base = with_trailing_slash(&dir.replace('\\', "/"));
    let files: Vec<String> = view
        .list_paths()
        .into_iter()
        .filter(|path| !is_dir_entry(view, path))
        .collect();

    let under: Vec<&String> = files.iter().filter(|path| path.starts_with(&base)).collect();

    let matched: Vec<String> = under
        .iter()
        .filter(|path| {
            let relative = path.strip_prefix(&base).unwrap_or(path.as_str()).to_lowercase();
            keywords.iter().any(|keyword| relative.contains(&keyword.to_lowercase()))
        })
        .map(|path| (*path).clone())
        .collect();
    if !matched.is_empty() {
        return matched;
    }

    if !under.is_empty() {
        return under.into_iter().cloned().collect();
    }

    let Some(last) = last_segment(&base) else {
        return Vec::new();
    };
    let last = last.to_lowercase();
    files
        .into_iter()
        .filter(|path| path.to_lowercase().contains(&last))
        .collect()
}

/// Finds the layer directories of the board.
///
/// Looks for a steps directory, picks the step containing `pcb` (or the
/// first one), then its `layers` directory. Without a usable steps tree,
/// the first directory containing `layers/` is used instead.
pub fn locate_layer_directories(view: &dyn ArchiveView) -> Option<LayerDirectories> {
    if let Some(found) = STEPS_HINTS
        .iter()
        .find_map(|hint| find_directory(view, hint, true))
        .and_then(|steps| layers_in_steps(view, &steps))
    {
        return Some(found);
    }

    debug!("no steps tree with layers; searching for a layers directory");
    let layers_dir = directories(view)
        .into_iter()
        .find(|dir| dir.to_lowercase().contains("layers/"))?;
    let layer_dirs = list_subdirectories(view, &layers_dir);
    if layer_dirs.is_empty() {
        return None;
    }
    Some(LayerDirectories {
        layers_dir,
        layer_dirs,
    })
}

fn layers_in_steps(view: &dyn ArchiveView, steps: &str) -> Option<LayerDirectories> {
    let step_dirs = list_subdirectories(view, steps);
    let step = step_dirs
        .iter()
        .find(|dir| dir.to_lowercase().contains("pcb"))
        .or_else(|| step_dirs.first())?;
    debug!(steps, step = %step, "selected step");

    let layers_dir = find_directory(view, &format!("{step}layers"), false)
        .or_else(|| find_directory(view, &format!("{}_layers", step.trim_end_matches('/')), false))
        .or_else(|| {
            directories(view).into_iter().find(|dir| {
                dir.strip_prefix(step.as_str())
                    .is_some_and(|rest| rest.to_lowercase().contains("layer"))
            })
        })?;

    let layer_dirs = list_subdirectories(view, &layers_dir);
    if layer_dirs.is_empty() {
        return None;
    }
    Some(LayerDirectories {
        layers_dir,
        layer_dirs,
    })
}

/// Finds the board profile file.
///
/// Tries the well-known exact paths, then `profile/` directories (preferring
/// a `features` or `outline` file inside), then profile-like names under the
/// steps directories, then profile-like names anywhere in the archive.
pub fn find_profile_file(view: &dyn ArchiveView) -> Option<String> {
    let paths = view.list_paths();
    let files: Vec<&String> = paths.iter().filter(|path| !is_dir_entry(view, path)).collect();

    if let Some(exact) = PROFILE_PATHS
        .iter()
        .find(|candidate| files.iter().any(|file| file.as_str() == **candidate))
    {
        return Some((*exact).to_string());
    }

    for candidate in PROFILE_PATHS.iter().take(3) {
        let dir = format!("{candidate}/");
        let inside: Vec<&String> = files
            .iter()
            .copied()
            .filter(|file| file.starts_with(&dir))
            .collect();
        let preferred = inside.iter().find(|file| {
            let lower = file.to_lowercase();
            lower.ends_with("features") || lower.ends_with("feat") || lower.contains("outline")
        });
        if let Some(found) = preferred.or_else(|| inside.first()) {
            return Some((*found).clone());
        }
    }

    for dir in PROFILE_SEARCH_DIRS {
        if let Some(found) = files
            .iter()
            .find(|file| file.starts_with(dir) && is_profile_like(file))
        {
            return Some((*found).clone());
        }
    }

    files
        .into_iter()
        .find(|file| is_profile_like(file))
        .cloned()
}

/// `profile`, `profile.*`, any name containing `outline`, or a `features`
/// file sitting in a `profile` directory.
fn is_profile_like(path: &str) -> bool {
    let mut segments = path.rsplit('/');
    let base = segments.next().unwrap_or_default().to_lowercase();
    let parent = segments.next().unwrap_or_default().to_lowercase();
    base == "profile"
        || base.starts_with("profile.")
        || base.contains("outline")
        || (parent == "profile" && (base == "features" || base.starts_with("features.")))
}

fn is_dir_entry(view: &dyn ArchiveView, path: &str) -> bool {
    path.ends_with('/') || view.is_directory(path)
}

fn last_segment(path: &str) -> Option<&str> {
    path.split('/').rfind(|s| !s.is_empty())
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
