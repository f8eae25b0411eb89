//! Tantivy-based search index module.
//!
//! Full-text search over the equipment catalog, backing the equipment
//! search query and the search-bar suggestions. The index is rebuilt from
//! the database at startup; the catalog is immutable afterwards.

use std::path::Path;
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, QueryParser};
use tantivy::schema::{Field, Schema, Value, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::Equipment;

/// Field boost values: display name over the catalog slug.
const BOOST_NAME: f32 = 10.0;
const BOOST_SLUG: f32 = 4.0;

/// Maximum edit distance for suggestion matching.
const SUGGEST_DISTANCE: u8 = 1;

/// Search result with equipment id and relevance score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub equipment_id: String,
    pub score: f32,
}

/// Search index schema fields.
struct SearchFields {
    equipment_id: Field,
    name: Field,
    slug: Field,
}

/// Tantivy search index for the equipment catalog.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Arc<RwLock<IndexWriter>>,
    fields: SearchFields,
}

impl SearchIndex {
    /// Create or open a search index at the specified path.
    pub fn open(index_path: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(index_path)
            .map_err(|e| AppError::Search(format!("Failed to create index directory: {}", e)))?;

        // Define schema
        let mut schema_builder = Schema::builder();
        let equipment_id = schema_builder.add_text_field("equipment_id", STORED);
        let name = schema_builder.add_text_field("name", TEXT | STORED);
        let slug = schema_builder.add_text_field("slug", TEXT);
        let schema = schema_builder.build();

        let fields = SearchFields {
            equipment_id,
            name,
            slug,
        };

        // Try to open existing index or create new one
        let index = Index::open_in_dir(index_path)
            .or_else(|_| Index::create_in_dir(index_path, schema.clone()))
            .map_err(|e| AppError::Search(format!("Failed to open/create index: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(|e| AppError::Search(format!("Failed to create reader: {}", e)))?;

        let writer = index
            .writer(50_000_000) // 50MB buffer
            .map_err(|e| AppError::Search(format!("Failed to create writer: {}", e)))?;

        Ok(Self {
            index,
            reader,
            writer: Arc::new(RwLock::new(writer)),
            fields,
        })
    }

    /// Rebuild the entire index from the equipment catalog.
    pub async fn rebuild(&self, equipments: &[Equipment]) -> Result<(), AppError> {
        let mut writer = self.writer.write().await;

        // Clear existing index
        writer.delete_all_documents()?;

        for equipment in equipments {
            writer.add_document(doc!(
                self.fields.equipment_id => equipment.id.clone(),
                self.fields.name => equipment.name.clone(),
                self.fields.slug => equipment.index.clone(),
            ))?;
        }

        writer.commit()?;

        // Reload reader to see new documents
        self.reader.reload()?;

        tracing::info!("Search index rebuilt with {} equipments", equipments.len());
        Ok(())
    }

    /// Search the catalog for equipment matching the query.
    pub fn search(
        &self,
        query_str: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchResult>, AppError> {
        if query_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();

        let base_parser =
            QueryParser::for_index(&self.index, vec![self.fields.name, self.fields.slug]);
        let base_query = base_parser
            .parse_query(query_str)
            .map_err(|e| AppError::Search(format!("Invalid search query: {}", e)))?;

        // Field-specific boosted queries, OR-combined
        let mut subqueries: Vec<(Occur, Box<dyn tantivy::query::Query>)> = Vec::new();
        for (field, boost) in [
            (self.fields.name, BOOST_NAME),
            (self.fields.slug, BOOST_SLUG),
        ] {
            let field_parser = QueryParser::for_index(&self.index, vec![field]);
            if let Ok(field_query) = field_parser.parse_query(query_str) {
                let boosted = BoostQuery::new(field_query, boost);
                subqueries.push((Occur::Should, Box::new(boosted)));
            }
        }

        let combined_query = if subqueries.is_empty() {
            base_query
        } else {
            Box::new(BooleanQuery::new(subqueries))
        };

        let top_docs = searcher
            .search(&combined_query, &TopDocs::with_limit(limit + offset))
            .map_err(|e| AppError::Search(format!("Search failed: {}", e)))?;

        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let equipment_id = doc
                    .get_first(self.fields.equipment_id)?
                    .as_str()?
                    .to_string();
                Some(SearchResult {
                    equipment_id,
                    score,
                })
            })
            .collect();

        Ok(results)
    }

    /// Prefix suggestions for the search bar. Matches the first token of
    /// the input against equipment names, tolerating one edit.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Result<Vec<SearchResult>, AppError> {
        let prefix = prefix.trim().to_lowercase();
        let Some(token) = prefix.split_whitespace().next() else {
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();

        let term = Term::from_field_text(self.fields.name, token);
        let query = FuzzyTermQuery::new_prefix(term, SUGGEST_DISTANCE, true);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| AppError::Search(format!("Suggestion search failed: {}", e)))?;

        let results: Vec<SearchResult> = top_docs
            .into_iter()
            .filter_map(|(score, doc_address)| {
                let doc: TantivyDocument = searcher.doc(doc_address).ok()?;
                let equipment_id = doc
                    .get_first(self.fields.equipment_id)?
                    .as_str()?
                    .to_string();
                Some(SearchResult {
                    equipment_id,
                    score,
                })
            })
            .collect();

        Ok(results)
    }
}
