//! Catalog service facade.
//!
//! Every operation takes the caller's [`CancelToken`] and owned payloads.
//! Mutations check the write capability before anything is validated or
//! built, then dispatch to the storage layer and clear the aggregate cache.
//! List calls validate and sanitize their parameters against the entity's
//! list policy. Comic and category reads return assembled aggregates.

use std::path::Path;
use std::sync::Arc;

use comicdex_catalog::params::{
    ListPolicy, CATEGORY_LIST, CATEGORY_RELATION_LIST, COMIC_CATEGORY_LIST, COMIC_CHAPTER_LIST,
    COMIC_COVER_LIST, COMIC_EXTERNAL_LIST, COMIC_LIST, COMIC_RELATION_LIST, COMIC_SYNOPSIS_LIST,
    COMIC_TAG_LIST, COMIC_TITLE_LIST, LANGUAGE_LIST, TAG_LIST, TYPE_DEF_LIST, WEBSITE_LIST,
};
use comicdex_catalog::*;
use comicdex_db::condition::Condition;
use comicdex_db::engine::Table;
use comicdex_db::type_def::{CATEGORY_TYPE, COMIC_RELATION_TYPE, TAG_TYPE};
use comicdex_db::{
    category, chapter, comic, comic_links, comic_parts, comic_relation, language, tag, type_def,
    website, DataError, Pool, UnitOfWork,
};
use rusqlite::Connection;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::assembler;
use crate::cache::{self, CacheBackend, MemoryCache};
use crate::cancel::CancelToken;
use crate::error::{OpenError, ServiceError};
use crate::permission::{require_write, Permissions};
use crate::settings::Settings;
use crate::store::Store;

/// Which of the three type tables an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Category,
    Tag,
    ComicRelation,
}

impl TypeKind {
    pub fn table(self) -> &'static Table {
        match self {
            Self::Category => &CATEGORY_TYPE,
            Self::Tag => &TAG_TYPE,
            Self::ComicRelation => &COMIC_RELATION_TYPE,
        }
    }

    pub fn entity(self) -> &'static str {
        self.table().entity
    }
}

/// How many seed entries of each kind were inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub languages: usize,
    pub websites: usize,
    pub category_types: usize,
    pub tag_types: usize,
    pub comic_relation_types: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.languages
            + self.websites
            + self.category_types
            + self.tag_types
            + self.comic_relation_types
    }
}

pub struct Catalog {
    store: Store,
    perms: Arc<dyn Permissions>,
    prefix: String,
    cache: Option<Arc<dyn CacheBackend>>,
}

impl Catalog {
    pub fn new(store: Store, perms: Arc<dyn Permissions>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            perms,
            prefix: prefix.into(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Open the configured database, creating its directory and schema as
    /// needed, with an in-memory cache when enabled.
    pub fn open(settings: &Settings, perms: Arc<dyn Permissions>) -> Result<Self, OpenError> {
        let path = settings.database.resolved_path();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| OpenError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        }
        let pool = Pool::open(&path, settings.database.pool_size)?;
        let catalog = Self::new(Store::new(pool), perms, &settings.auth.permission_prefix);
        Ok(if settings.cache.enabled {
            catalog.with_cache(Arc::new(MemoryCache::new(settings.cache.ttl())))
        } else {
            catalog
        })
    }

    /// Start sweeping expired cache entries in the background. `None` when
    /// caching is off.
    pub fn spawn_cache_sweeper(&self, every: std::time::Duration) -> Option<JoinHandle<()>> {
        self.cache
            .as_ref()
            .map(|c| cache::spawn_sweeper(Arc::clone(c), every))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ── Plumbing ────────────────────────────────────────────────────────────

    async fn read<T, F>(&self, cx: &CancelToken, f: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DataError> + Send + 'static,
    {
        self.store.run(cx, f).await
    }

    async fn write<T, F>(
        &self,
        cx: &CancelToken,
        verb: &str,
        entity: &str,
        f: F,
    ) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DataError> + Send + 'static,
    {
        require_write(self.perms.as_ref(), &self.prefix, verb, entity)?;
        let out = self.store.run(cx, f).await?;
        self.invalidate();
        Ok(out)
    }

    fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear() {
                log::warn!("cache clear failed: {e}");
            }
        }
    }

    fn cached(&self, code: &str) -> Option<Comic> {
        let cache = self.cache.as_ref()?;
        match cache.get(code) {
            Ok(hit) => hit,
            Err(e) => {
                log::warn!("cache read failed: {e}");
                None
            }
        }
    }

    fn remember(&self, comic: &Comic) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(comic.clone()) {
                log::warn!("cache write failed: {e}");
            }
        }
    }

    // ── Seeding ─────────────────────────────────────────────────────────────

    /// Insert the seed entries that are not present yet, in one unit of work.
    pub async fn seed(&self, cx: &CancelToken, data: SeedData) -> Result<SeedReport, ServiceError> {
        let report = self
            .write(cx, "seed", "reference data", move |conn| {
                let unit = UnitOfWork::begin(conn)?;
                let mut report = SeedReport::default();
                for v in &data.languages {
                    if !language::exists_language(&unit, &v.ietf)? {
                        language::add_language(&unit, v)?;
                        report.languages += 1;
                    }
                }
                for v in &data.websites {
                    if !website::exists_website(&unit, &v.domain)? {
                        website::add_website(&unit, v)?;
                        report.websites += 1;
                    }
                }
                let types = [
                    (&CATEGORY_TYPE, &data.category_types, &mut report.category_types),
                    (&TAG_TYPE, &data.tag_types, &mut report.tag_types),
                    (
                        &COMIC_RELATION_TYPE,
                        &data.comic_relation_types,
                        &mut report.comic_relation_types,
                    ),
                ];
                for (table, rows, added) in types {
                    for v in rows {
                        if !type_def::exists_type(&unit, table, &v.code)? {
                            type_def::add_type(&unit, table, v)?;
                            *added += 1;
                        }
                    }
                }
                unit.commit()?;
                Ok(report)
            })
            .await?;
        log::info!("seeded {} reference entries", report.total());
        Ok(report)
    }

    pub async fn seed_from_path(
        &self,
        cx: &CancelToken,
        path: &Path,
    ) -> Result<SeedReport, ServiceError> {
        let data = load_seed(path)
            .map_err(|e| ServiceError::Data(DataError::generic(e.to_string())))?;
        self.seed(cx, data).await
    }

    // ── Languages ───────────────────────────────────────────────────────────

    pub async fn add_language(
        &self,
        cx: &CancelToken,
        v: AddLanguage,
    ) -> Result<Language, ServiceError> {
        self.write(cx, "add", "language", move |c| language::add_language(c, &v))
            .await
    }

    pub async fn batch_add_language(
        &self,
        cx: &CancelToken,
        vs: Vec<AddLanguage>,
    ) -> Result<usize, ServiceError> {
        self.write(cx, "add", "language", move |c| language::batch_add_language(c, &vs))
            .await
    }

    pub async fn get_language_by_ietf(
        &self,
        cx: &CancelToken,
        ietf: String,
    ) -> Result<Language, ServiceError> {
        self.read(cx, move |c| language::get_language_by_ietf(c, &ietf)).await
    }

    pub async fn update_language(
        &self,
        cx: &CancelToken,
        ietf: String,
        v: SetLanguage,
    ) -> Result<Language, ServiceError> {
        self.write(cx, "update", "language", move |c| {
            language::update_language(c, &ietf, &v)
        })
        .await
    }

    pub async fn delete_language(
        &self,
        cx: &CancelToken,
        ietf: String,
    ) -> Result<Language, ServiceError> {
        self.write(cx, "delete", "language", move |c| language::delete_language(c, &ietf))
            .await
    }

    pub async fn list_language(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<Language>, ServiceError> {
        let params = listing(&LANGUAGE_LIST, params)?;
        self.read(cx, move |c| language::list_language(c, &cond, &params)).await
    }

    pub async fn count_language(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| language::count_language(c, &cond)).await
    }

    pub async fn exists_language(
        &self,
        cx: &CancelToken,
        ietf: String,
    ) -> Result<bool, ServiceError> {
        self.read(cx, move |c| language::exists_language(c, &ietf)).await
    }

    // ── Websites ────────────────────────────────────────────────────────────

    pub async fn add_website(
        &self,
        cx: &CancelToken,
        v: AddWebsite,
    ) -> Result<Website, ServiceError> {
        self.write(cx, "add", "website", move |c| website::add_website(c, &v)).await
    }

    pub async fn batch_add_website(
        &self,
        cx: &CancelToken,
        vs: Vec<AddWebsite>,
    ) -> Result<usize, ServiceError> {
        self.write(cx, "add", "website", move |c| website::batch_add_website(c, &vs))
            .await
    }

    pub async fn get_website_by_domain(
        &self,
        cx: &CancelToken,
        domain: String,
    ) -> Result<Website, ServiceError> {
        self.read(cx, move |c| website::get_website_by_domain(c, &domain)).await
    }

    pub async fn update_website(
        &self,
        cx: &CancelToken,
        domain: String,
        v: SetWebsite,
    ) -> Result<Website, ServiceError> {
        self.write(cx, "update", "website", move |c| {
            website::update_website(c, &domain, &v)
        })
        .await
    }

    pub async fn delete_website(
        &self,
        cx: &CancelToken,
        domain: String,
    ) -> Result<Website, ServiceError> {
        self.write(cx, "delete", "website", move |c| website::delete_website(c, &domain))
            .await
    }

    pub async fn list_website(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<Website>, ServiceError> {
        let params = listing(&WEBSITE_LIST, params)?;
        self.read(cx, move |c| website::list_website(c, &cond, &params)).await
    }

    pub async fn count_website(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| website::count_website(c, &cond)).await
    }

    pub async fn exists_website(
        &self,
        cx: &CancelToken,
        domain: String,
    ) -> Result<bool, ServiceError> {
        self.read(cx, move |c| website::exists_website(c, &domain)).await
    }

    // ── Type tables ─────────────────────────────────────────────────────────

    pub async fn add_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        v: AddTypeDef,
    ) -> Result<TypeDef, ServiceError> {
        self.write(cx, "add", kind.entity(), move |c| {
            type_def::add_type(c, kind.table(), &v)
        })
        .await
    }

    pub async fn batch_add_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        vs: Vec<AddTypeDef>,
    ) -> Result<usize, ServiceError> {
        self.write(cx, "add", kind.entity(), move |c| {
            type_def::batch_add_type(c, kind.table(), &vs)
        })
        .await
    }

    pub async fn get_type_by_code(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        code: String,
    ) -> Result<TypeDef, ServiceError> {
        self.read(cx, move |c| type_def::get_type_by_code(c, kind.table(), &code))
            .await
    }

    pub async fn update_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        code: String,
        v: SetTypeDef,
    ) -> Result<TypeDef, ServiceError> {
        self.write(cx, "update", kind.entity(), move |c| {
            type_def::update_type(c, kind.table(), &code, &v)
        })
        .await
    }

    pub async fn delete_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        code: String,
    ) -> Result<TypeDef, ServiceError> {
        self.write(cx, "delete", kind.entity(), move |c| {
            type_def::delete_type(c, kind.table(), &code)
        })
        .await
    }

    pub async fn list_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<TypeDef>, ServiceError> {
        let params = listing(&TYPE_DEF_LIST, params)?;
        self.read(cx, move |c| type_def::list_type(c, kind.table(), &cond, &params))
            .await
    }

    pub async fn count_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| type_def::count_type(c, kind.table(), &cond))
            .await
    }

    pub async fn exists_type(
        &self,
        cx: &CancelToken,
        kind: TypeKind,
        code: String,
    ) -> Result<bool, ServiceError> {
        self.read(cx, move |c| type_def::exists_type(c, kind.table(), &code))
            .await
    }

    // ── Categories ──────────────────────────────────────────────────────────

    pub async fn add_category(
        &self,
        cx: &CancelToken,
        v: AddCategory,
    ) -> Result<Category, ServiceError> {
        self.write(cx, "add", "category", move |c| category::add_category(c, &v))
            .await
    }

    /// The category with its outgoing hierarchy edges.
    pub async fn get_category_by_sid(
        &self,
        cx: &CancelToken,
        sid: CategorySid,
    ) -> Result<Category, ServiceError> {
        assembler::category_by_sid(&self.store, cx, sid).await
    }

    pub async fn update_category(
        &self,
        cx: &CancelToken,
        sid: CategorySid,
        v: SetCategory,
    ) -> Result<Category, ServiceError> {
        self.write(cx, "update", "category", move |c| {
            category::update_category(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_category(
        &self,
        cx: &CancelToken,
        sid: CategorySid,
    ) -> Result<Category, ServiceError> {
        self.write(cx, "delete", "category", move |c| category::delete_category(c, &sid))
            .await
    }

    pub async fn list_category(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<Category>, ServiceError> {
        let params = listing(&CATEGORY_LIST, params)?;
        let mut categories = self
            .read(cx, move |c| category::list_category(c, &cond, &params))
            .await?;
        assembler::attach_category_relations(&self.store, cx, &mut categories).await?;
        Ok(categories)
    }

    pub async fn count_category(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| category::count_category(c, &cond)).await
    }

    pub async fn exists_category(
        &self,
        cx: &CancelToken,
        sid: CategorySid,
    ) -> Result<bool, ServiceError> {
        self.read(cx, move |c| category::exists_category(c, &sid)).await
    }

    pub async fn add_category_relation(
        &self,
        cx: &CancelToken,
        v: AddCategoryRelation,
    ) -> Result<CategoryRelation, ServiceError> {
        self.write(cx, "add", "category relation", move |c| {
            category::add_category_relation(c, &v)
        })
        .await
    }

    pub async fn get_category_relation(
        &self,
        cx: &CancelToken,
        sid: CategoryRelationSid,
    ) -> Result<CategoryRelation, ServiceError> {
        self.read(cx, move |c| category::get_category_relation(c, &sid)).await
    }

    pub async fn update_category_relation(
        &self,
        cx: &CancelToken,
        sid: CategoryRelationSid,
        v: SetCategoryRelation,
    ) -> Result<CategoryRelation, ServiceError> {
        self.write(cx, "update", "category relation", move |c| {
            category::update_category_relation(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_category_relation(
        &self,
        cx: &CancelToken,
        sid: CategoryRelationSid,
    ) -> Result<CategoryRelation, ServiceError> {
        self.write(cx, "delete", "category relation", move |c| {
            category::delete_category_relation(c, &sid)
        })
        .await
    }

    pub async fn list_category_relation(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<CategoryRelation>, ServiceError> {
        let params = listing(&CATEGORY_RELATION_LIST, params)?;
        self.read(cx, move |c| category::list_category_relation(c, &cond, &params))
            .await
    }

    pub async fn count_category_relation(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| category::count_category_relation(c, &cond))
            .await
    }

    // ── Tags ────────────────────────────────────────────────────────────────

    pub async fn add_tag(&self, cx: &CancelToken, v: AddTag) -> Result<Tag, ServiceError> {
        self.write(cx, "add", "tag", move |c| tag::add_tag(c, &v)).await
    }

    pub async fn get_tag_by_sid(&self, cx: &CancelToken, sid: TagSid) -> Result<Tag, ServiceError> {
        self.read(cx, move |c| tag::get_tag_by_sid(c, &sid)).await
    }

    pub async fn update_tag(
        &self,
        cx: &CancelToken,
        sid: TagSid,
        v: SetTag,
    ) -> Result<Tag, ServiceError> {
        self.write(cx, "update", "tag", move |c| tag::update_tag(c, &sid, &v))
            .await
    }

    pub async fn delete_tag(&self, cx: &CancelToken, sid: TagSid) -> Result<Tag, ServiceError> {
        self.write(cx, "delete", "tag", move |c| tag::delete_tag(c, &sid)).await
    }

    pub async fn list_tag(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<Tag>, ServiceError> {
        let params = listing(&TAG_LIST, params)?;
        self.read(cx, move |c| tag::list_tag(c, &cond, &params)).await
    }

    pub async fn count_tag(&self, cx: &CancelToken, cond: Condition) -> Result<i64, ServiceError> {
        self.read(cx, move |c| tag::count_tag(c, &cond)).await
    }

    pub async fn exists_tag(&self, cx: &CancelToken, sid: TagSid) -> Result<bool, ServiceError> {
        self.read(cx, move |c| tag::exists_tag(c, &sid)).await
    }

    // ── Comics ──────────────────────────────────────────────────────────────

    /// The new comic, with every dependent collection empty.
    pub async fn add_comic(&self, cx: &CancelToken, v: AddComic) -> Result<Comic, ServiceError> {
        self.write(cx, "add", "comic", move |c| comic::add_comic(c, &v)).await
    }

    /// The full comic aggregate, served from the cache when possible.
    pub async fn get_comic_by_code(
        &self,
        cx: &CancelToken,
        code: String,
    ) -> Result<Comic, ServiceError> {
        if let Some(hit) = self.cached(&code) {
            return Ok(hit);
        }
        let comic = assembler::comic_by_code(&self.store, cx, code).await?;
        self.remember(&comic);
        Ok(comic)
    }

    pub async fn update_comic(
        &self,
        cx: &CancelToken,
        code: String,
        v: SetComic,
    ) -> Result<Comic, ServiceError> {
        self.write(cx, "update", "comic", move |c| comic::update_comic(c, &code, &v))
            .await
    }

    pub async fn delete_comic(
        &self,
        cx: &CancelToken,
        code: String,
    ) -> Result<Comic, ServiceError> {
        self.write(cx, "delete", "comic", move |c| comic::delete_comic(c, &code))
            .await
    }

    /// A page of comic aggregates. `external` restricts the page to comics
    /// with at least one matching external link.
    pub async fn list_comic(
        &self,
        cx: &CancelToken,
        cond: Condition,
        external: Option<Condition>,
        params: ListParams,
    ) -> Result<Vec<Comic>, ServiceError> {
        let params = listing(&COMIC_LIST, params)?;
        let mut comics = self
            .read(cx, move |c| comic::list_comic(c, &cond, external.as_ref(), &params))
            .await?;
        assembler::attach_comic_dependents(&self.store, cx, &mut comics).await?;
        Ok(comics)
    }

    pub async fn count_comic(
        &self,
        cx: &CancelToken,
        cond: Condition,
        external: Option<Condition>,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic::count_comic(c, &cond, external.as_ref()))
            .await
    }

    pub async fn exists_comic_by_code(
        &self,
        cx: &CancelToken,
        code: String,
    ) -> Result<bool, ServiceError> {
        self.read(cx, move |c| comic::exists_comic_by_code(c, &code)).await
    }

    // ── Comic titles ────────────────────────────────────────────────────────

    pub async fn add_comic_title(
        &self,
        cx: &CancelToken,
        v: AddComicTitle,
    ) -> Result<ComicTitle, ServiceError> {
        self.write(cx, "add", "comic title", move |c| comic_parts::add_comic_title(c, &v))
            .await
    }

    pub async fn batch_add_comic_title(
        &self,
        cx: &CancelToken,
        vs: Vec<AddComicTitle>,
    ) -> Result<Vec<ComicTitle>, ServiceError> {
        self.write(cx, "add", "comic title", move |c| {
            comic_parts::batch_add_comic_title(c, &vs)
        })
        .await
    }

    pub async fn get_comic_title(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicTitle, ServiceError> {
        self.read(cx, move |c| comic_parts::get_comic_title(c, &sid)).await
    }

    pub async fn update_comic_title(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
        v: SetComicTitle,
    ) -> Result<ComicTitle, ServiceError> {
        self.write(cx, "update", "comic title", move |c| {
            comic_parts::update_comic_title(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_title(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicTitle, ServiceError> {
        self.write(cx, "delete", "comic title", move |c| {
            comic_parts::delete_comic_title(c, &sid)
        })
        .await
    }

    pub async fn list_comic_title(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicTitle>, ServiceError> {
        let params = listing(&COMIC_TITLE_LIST, params)?;
        self.read(cx, move |c| comic_parts::list_comic_title(c, &cond, &params))
            .await
    }

    pub async fn count_comic_title(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_parts::count_comic_title(c, &cond)).await
    }

    // ── Comic covers ────────────────────────────────────────────────────────

    pub async fn add_comic_cover(
        &self,
        cx: &CancelToken,
        v: AddComicCover,
    ) -> Result<ComicCover, ServiceError> {
        self.write(cx, "add", "comic cover", move |c| comic_parts::add_comic_cover(c, &v))
            .await
    }

    pub async fn get_comic_cover(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicCover, ServiceError> {
        self.read(cx, move |c| comic_parts::get_comic_cover(c, &sid)).await
    }

    pub async fn update_comic_cover(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
        v: SetComicCover,
    ) -> Result<ComicCover, ServiceError> {
        self.write(cx, "update", "comic cover", move |c| {
            comic_parts::update_comic_cover(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_cover(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicCover, ServiceError> {
        self.write(cx, "delete", "comic cover", move |c| {
            comic_parts::delete_comic_cover(c, &sid)
        })
        .await
    }

    pub async fn list_comic_cover(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicCover>, ServiceError> {
        let params = listing(&COMIC_COVER_LIST, params)?;
        self.read(cx, move |c| comic_parts::list_comic_cover(c, &cond, &params))
            .await
    }

    pub async fn count_comic_cover(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_parts::count_comic_cover(c, &cond)).await
    }

    // ── Comic synopses ──────────────────────────────────────────────────────

    pub async fn add_comic_synopsis(
        &self,
        cx: &CancelToken,
        v: AddComicSynopsis,
    ) -> Result<ComicSynopsis, ServiceError> {
        self.write(cx, "add", "comic synopsis", move |c| {
            comic_parts::add_comic_synopsis(c, &v)
        })
        .await
    }

    pub async fn get_comic_synopsis(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicSynopsis, ServiceError> {
        self.read(cx, move |c| comic_parts::get_comic_synopsis(c, &sid)).await
    }

    pub async fn update_comic_synopsis(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
        v: SetComicSynopsis,
    ) -> Result<ComicSynopsis, ServiceError> {
        self.write(cx, "update", "comic synopsis", move |c| {
            comic_parts::update_comic_synopsis(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_synopsis(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicSynopsis, ServiceError> {
        self.write(cx, "delete", "comic synopsis", move |c| {
            comic_parts::delete_comic_synopsis(c, &sid)
        })
        .await
    }

    pub async fn list_comic_synopsis(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicSynopsis>, ServiceError> {
        let params = listing(&COMIC_SYNOPSIS_LIST, params)?;
        self.read(cx, move |c| comic_parts::list_comic_synopsis(c, &cond, &params))
            .await
    }

    pub async fn count_comic_synopsis(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_parts::count_comic_synopsis(c, &cond))
            .await
    }

    // ── Comic externals ─────────────────────────────────────────────────────

    pub async fn add_comic_external(
        &self,
        cx: &CancelToken,
        v: AddComicExternal,
    ) -> Result<ComicExternal, ServiceError> {
        self.write(cx, "add", "comic external", move |c| {
            comic_parts::add_comic_external(c, &v)
        })
        .await
    }

    pub async fn get_comic_external(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicExternal, ServiceError> {
        self.read(cx, move |c| comic_parts::get_comic_external(c, &sid)).await
    }

    pub async fn update_comic_external(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
        v: SetComicExternal,
    ) -> Result<ComicExternal, ServiceError> {
        self.write(cx, "update", "comic external", move |c| {
            comic_parts::update_comic_external(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_external(
        &self,
        cx: &CancelToken,
        sid: ComicGenericSid,
    ) -> Result<ComicExternal, ServiceError> {
        self.write(cx, "delete", "comic external", move |c| {
            comic_parts::delete_comic_external(c, &sid)
        })
        .await
    }

    pub async fn list_comic_external(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicExternal>, ServiceError> {
        let params = listing(&COMIC_EXTERNAL_LIST, params)?;
        self.read(cx, move |c| comic_parts::list_comic_external(c, &cond, &params))
            .await
    }

    pub async fn count_comic_external(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_parts::count_comic_external(c, &cond))
            .await
    }

    // ── Comic categories and tags ───────────────────────────────────────────

    pub async fn add_comic_category(
        &self,
        cx: &CancelToken,
        v: AddComicCategory,
    ) -> Result<ComicCategory, ServiceError> {
        self.write(cx, "add", "comic category", move |c| {
            comic_links::add_comic_category(c, &v)
        })
        .await
    }

    pub async fn get_comic_category(
        &self,
        cx: &CancelToken,
        sid: ComicCategorySid,
    ) -> Result<ComicCategory, ServiceError> {
        self.read(cx, move |c| comic_links::get_comic_category(c, &sid)).await
    }

    pub async fn update_comic_category(
        &self,
        cx: &CancelToken,
        sid: ComicCategorySid,
        v: SetComicCategory,
    ) -> Result<ComicCategory, ServiceError> {
        self.write(cx, "update", "comic category", move |c| {
            comic_links::update_comic_category(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_category(
        &self,
        cx: &CancelToken,
        sid: ComicCategorySid,
    ) -> Result<ComicCategory, ServiceError> {
        self.write(cx, "delete", "comic category", move |c| {
            comic_links::delete_comic_category(c, &sid)
        })
        .await
    }

    pub async fn list_comic_category(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicCategory>, ServiceError> {
        let params = listing(&COMIC_CATEGORY_LIST, params)?;
        self.read(cx, move |c| comic_links::list_comic_category(c, &cond, &params))
            .await
    }

    pub async fn count_comic_category(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_links::count_comic_category(c, &cond))
            .await
    }

    pub async fn add_comic_tag(
        &self,
        cx: &CancelToken,
        v: AddComicTag,
    ) -> Result<ComicTag, ServiceError> {
        self.write(cx, "add", "comic tag", move |c| comic_links::add_comic_tag(c, &v))
            .await
    }

    pub async fn get_comic_tag(
        &self,
        cx: &CancelToken,
        sid: ComicTagSid,
    ) -> Result<ComicTag, ServiceError> {
        self.read(cx, move |c| comic_links::get_comic_tag(c, &sid)).await
    }

    pub async fn update_comic_tag(
        &self,
        cx: &CancelToken,
        sid: ComicTagSid,
        v: SetComicTag,
    ) -> Result<ComicTag, ServiceError> {
        self.write(cx, "update", "comic tag", move |c| {
            comic_links::update_comic_tag(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_tag(
        &self,
        cx: &CancelToken,
        sid: ComicTagSid,
    ) -> Result<ComicTag, ServiceError> {
        self.write(cx, "delete", "comic tag", move |c| {
            comic_links::delete_comic_tag(c, &sid)
        })
        .await
    }

    pub async fn list_comic_tag(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicTag>, ServiceError> {
        let params = listing(&COMIC_TAG_LIST, params)?;
        self.read(cx, move |c| comic_links::list_comic_tag(c, &cond, &params))
            .await
    }

    pub async fn count_comic_tag(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_links::count_comic_tag(c, &cond)).await
    }

    // ── Comic relations ─────────────────────────────────────────────────────

    pub async fn add_comic_relation(
        &self,
        cx: &CancelToken,
        v: AddComicRelation,
    ) -> Result<ComicRelation, ServiceError> {
        self.write(cx, "add", "comic relation", move |c| {
            comic_relation::add_comic_relation(c, &v)
        })
        .await
    }

    pub async fn get_comic_relation(
        &self,
        cx: &CancelToken,
        sid: ComicRelationSid,
    ) -> Result<ComicRelation, ServiceError> {
        self.read(cx, move |c| comic_relation::get_comic_relation(c, &sid))
            .await
    }

    pub async fn update_comic_relation(
        &self,
        cx: &CancelToken,
        sid: ComicRelationSid,
        v: SetComicRelation,
    ) -> Result<ComicRelation, ServiceError> {
        self.write(cx, "update", "comic relation", move |c| {
            comic_relation::update_comic_relation(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_relation(
        &self,
        cx: &CancelToken,
        sid: ComicRelationSid,
    ) -> Result<ComicRelation, ServiceError> {
        self.write(cx, "delete", "comic relation", move |c| {
            comic_relation::delete_comic_relation(c, &sid)
        })
        .await
    }

    pub async fn list_comic_relation(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicRelation>, ServiceError> {
        let params = listing(&COMIC_RELATION_LIST, params)?;
        self.read(cx, move |c| comic_relation::list_comic_relation(c, &cond, &params))
            .await
    }

    pub async fn count_comic_relation(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| comic_relation::count_comic_relation(c, &cond))
            .await
    }

    // ── Comic chapters ──────────────────────────────────────────────────────

    pub async fn add_comic_chapter(
        &self,
        cx: &CancelToken,
        v: AddComicChapter,
    ) -> Result<ComicChapter, ServiceError> {
        self.write(cx, "add", "comic chapter", move |c| chapter::add_comic_chapter(c, &v))
            .await
    }

    pub async fn get_comic_chapter(
        &self,
        cx: &CancelToken,
        sid: ComicChapterSid,
    ) -> Result<ComicChapter, ServiceError> {
        self.read(cx, move |c| chapter::get_comic_chapter(c, &sid)).await
    }

    pub async fn update_comic_chapter(
        &self,
        cx: &CancelToken,
        sid: ComicChapterSid,
        v: SetComicChapter,
    ) -> Result<ComicChapter, ServiceError> {
        self.write(cx, "update", "comic chapter", move |c| {
            chapter::update_comic_chapter(c, &sid, &v)
        })
        .await
    }

    pub async fn delete_comic_chapter(
        &self,
        cx: &CancelToken,
        sid: ComicChapterSid,
    ) -> Result<ComicChapter, ServiceError> {
        self.write(cx, "delete", "comic chapter", move |c| {
            chapter::delete_comic_chapter(c, &sid)
        })
        .await
    }

    pub async fn list_comic_chapter(
        &self,
        cx: &CancelToken,
        cond: Condition,
        params: ListParams,
    ) -> Result<Vec<ComicChapter>, ServiceError> {
        let params = listing(&COMIC_CHAPTER_LIST, params)?;
        self.read(cx, move |c| chapter::list_comic_chapter(c, &cond, &params))
            .await
    }

    pub async fn count_comic_chapter(
        &self,
        cx: &CancelToken,
        cond: Condition,
    ) -> Result<i64, ServiceError> {
        self.read(cx, move |c| chapter::count_comic_chapter(c, &cond)).await
    }
}

/// Validate caller-supplied list parameters, then apply the entity's policy.
fn listing(policy: &ListPolicy, params: ListParams) -> Result<ListParams, ServiceError> {
    params.validate()?;
    Ok(policy.sanitize(params))
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;
