use anyhow::Result;
use cinevault_core::library::Catalog;
use cinevault_model::{KindFilter, SearchFilters};

pub fn run(
    query: Option<&str>,
    kind: KindFilter,
    genre: Option<String>,
    year: Option<u16>,
) -> Result<()> {
    let catalog = Catalog::with_fixtures()?;
    let filters = SearchFilters { kind, genre, year };
    let hits = catalog.search(query.unwrap_or_default(), &filters);

    if hits.is_empty() {
        println!("no titles match");
        return Ok(());
    }
    for content in hits {
        println!(
            "{:<8} {:<24} {:<6} {:<8} {:<9} {:.1}",
            content.id.as_str(),
            content.title,
            content.year,
            content.kind.as_str(),
            content.genre,
            content.rating
        );
    }
    Ok(())
}
