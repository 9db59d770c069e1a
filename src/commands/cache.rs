use crate::cache::{SourceCache, format_size};
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::config::Settings;
use crate::error::Result;

pub fn run(settings: &Settings, args: &CacheArgs) -> Result<()> {
    let cache = SourceCache::new(&settings.cache_dir);

    match args.command {
        Some(CacheSubcommand::List) => {
            show_cache_stats(&cache)?;
            println!();
            list_cached_sources(&cache)
        }
        Some(CacheSubcommand::Clear) => clear_cache(&cache),
        None => show_cache_stats(&cache),
    }
}

fn show_cache_stats(cache: &SourceCache) -> Result<()> {
    let entries = cache.entries()?;
    let packages: usize = entries.iter().map(|e| e.packages).sum();
    let size: u64 = entries.iter().map(|e| e.size).sum();

    println!("Cache Statistics:");
    println!("  Location: {}", cache.root().display());
    println!("  Sources: {}", entries.len());
    println!("  Packages: {packages}");
    println!("  Size: {}", format_size(size));

    if entries.is_empty() {
        println!("\nCache is empty.");
    }

    Ok(())
}

fn list_cached_sources(cache: &SourceCache) -> Result<()> {
    let entries = cache.entries()?;

    if entries.is_empty() {
        println!("No cached sources.");
        return Ok(());
    }

    println!("Cached sources ({}):", entries.len());
    for entry in &entries {
        println!(
            "  {} ({} package{}, {})",
            entry.source_name.as_deref().unwrap_or(&entry.slug),
            entry.packages,
            if entry.packages == 1 { "" } else { "s" },
            entry.formatted_size()
        );
        println!("    Path: {}", entry.path.display());
        if let Some(revision) = &entry.revision {
            println!("    Revision: {revision}");
        }
    }

    Ok(())
}

fn clear_cache(cache: &SourceCache) -> Result<()> {
    cache.clear()?;
    println!("Cache cleared successfully.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_show_cache_stats_empty() {
        let temp = TempDir::new().unwrap();
        let cache = SourceCache::new(temp.path());
        assert!(show_cache_stats(&cache).is_ok());
        assert!(list_cached_sources(&cache).is_ok());
    }

    #[test]
    fn test_clear_cache() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sources/0-example")).unwrap();
        let cache = SourceCache::new(temp.path());

        clear_cache(&cache).unwrap();
        assert!(!temp.path().join("sources").exists());
        assert!(cache.entries().unwrap().is_empty());
    }
}
