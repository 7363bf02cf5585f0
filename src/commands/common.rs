use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use rayon::ThreadPoolBuilder;
use solofeat_lib::utils;
use std::path::{Path, PathBuf};

static GLOBAL_RAYON_THREADS: OnceCell<usize> = OnceCell::new();

/// Path next to `path` with `suffix` appended to the file name, or `None`
/// when `path` is stdin/stdout (`-`).
pub fn sibling_path(path: &Path, suffix: &str) -> Option<PathBuf> {
    if path.as_os_str() == "-" {
        return None;
    }
    let name = path.file_name()?.to_string_lossy();
    Some(path.with_file_name(format!("{}{}", name, suffix)))
}

/// Configure the global Rayon thread pool exactly once, returning the active
/// worker count. Subsequent calls reuse the first configured pool and emit a
/// warning when the requested thread count differs from the established size.
pub fn configure_global_thread_pool(threads: usize) -> Result<usize> {
    let requested = utils::determine_allowed_cpus(threads)?;

    if let Some(active) = GLOBAL_RAYON_THREADS.get() {
        if *active != requested {
            log::warn!(
                "Rayon global thread pool already initialised with {} threads; ignoring request for {}",
                active,
                requested
            );
        }
        return Ok(*active);
    }

    match ThreadPoolBuilder::new().num_threads(requested).build_global() {
        Ok(_) => {
            GLOBAL_RAYON_THREADS
                .set(requested)
                .map_err(|_| anyhow!("Failed to record global Rayon thread count"))?;
            Ok(requested)
        }
        Err(err) => {
            // Pool was built elsewhere first; keep its size.
            log::debug!("Global Rayon thread pool initialisation skipped: {}", err);
            let fallback = rayon::current_num_threads();
            if fallback != requested {
                log::warn!(
                    "Using existing Rayon pool with {} threads instead of requested {}",
                    fallback,
                    requested
                );
            }
            GLOBAL_RAYON_THREADS.set(fallback).ok();
            Ok(fallback)
        }
    }
}
