//! GUID behavior: collision-checked GUID assignment on create/update and
//! lookup-by-GUID on construction.

use tracing::{debug, instrument};

use rowguid_core::{
    Construction, GuidConfig, GuidError, GuidGenerator, GuidResult, LookupToken,
    OnConstruct, OnCreate, OnUpdate, OsRandom, RandomSource, Record, Row, TokenKind,
};
use rowguid_observability::{NoticeSink, TracingNoticeSink};

use crate::query::{QueryExecutor, SelectOne};

/// Assigns each record a GUID not yet present in its table, and resolves
/// lookup tokens that are GUIDs.
///
/// ## Assignment
///
/// `ensure_identifier` generates a candidate, asks the executor whether a row
/// in the record's table already holds it, and repeats until one is free (at
/// most `max_attempts` checks). Each duplicate is reported to the notice sink
/// and discarded. Storage errors end the call immediately.
///
/// The check and the eventual write are not atomic. A unique constraint on
/// the GUID column should remain the final arbiter; see
/// [`crate::query::postgres::unique_guid_index_sql`].
///
/// ## Construction
///
/// `dispatch_construction` loads the record by GUID when the token is a
/// non-numeric string in canonical GUID form, and otherwise tells the caller
/// to carry on with normal key-based construction.
#[derive(Debug, Clone)]
pub struct GuidBehavior<E, N = TracingNoticeSink, S = OsRandom> {
    config: GuidConfig,
    executor: E,
    notices: N,
    generator: GuidGenerator<S>,
}

impl<E: QueryExecutor> GuidBehavior<E> {
    /// Validates `config`; collisions go to `tracing`, randomness to the OS.
    pub fn new(config: GuidConfig, executor: E) -> GuidResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            executor,
            notices: TracingNoticeSink,
            generator: GuidGenerator::new(),
        })
    }
}

impl<E, N, S> GuidBehavior<E, N, S> {
    pub fn with_notice_sink<N2: NoticeSink>(self, notices: N2) -> GuidBehavior<E, N2, S> {
        GuidBehavior {
            config: self.config,
            executor: self.executor,
            notices,
            generator: self.generator,
        }
    }

    pub fn with_random_source<S2: RandomSource>(self, source: S2) -> GuidBehavior<E, N, S2> {
        GuidBehavior {
            config: self.config,
            executor: self.executor,
            notices: self.notices,
            generator: GuidGenerator::with_source(source),
        }
    }

    pub fn config(&self) -> &GuidConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Column holding the GUID.
    pub fn column(&self) -> &str {
        &self.config.column
    }
}

impl<E, N, S> GuidBehavior<E, N, S>
where
    E: QueryExecutor,
    N: NoticeSink,
    S: RandomSource,
{
    /// Give `record` a GUID if its GUID column is empty.
    ///
    /// A record that already holds a value (see [`Record::has_value`]) is left
    /// alone and no storage call is made. The new value is written in memory only.
    #[instrument(
        skip(self, record),
        fields(table = record.table_name(), column = %self.config.column),
        err
    )]
    pub fn ensure_identifier<R: Record>(&self, record: &mut R) -> GuidResult<()> {
        let column = self.config.column.as_str();
        if record.has_value(column) {
            return Ok(());
        }

        let table = record.table_name().to_string();
        let mut query = SelectOne::new(
            table.as_str(),
            record.primary_key_column(),
            column,
            String::new(),
        );

        for attempt in 1..=self.config.max_attempts {
            let candidate = self.generator.generate()?;
            query.bind(candidate.to_string());

            match self.executor.find_one(&query)? {
                None => {
                    debug!(attempt, guid = %candidate, "assigned GUID");
                    record.set(column, query.value);
                    return Ok(());
                }
                Some(existing) => {
                    debug!(attempt, existing = %existing.primary_key, "GUID already taken");
                    self.notices
                        .notice(&format!("Duplicate GUID created for {table}"));
                }
            }
        }

        Err(GuidError::retry_exhausted(table, self.config.max_attempts))
    }

    /// Decide how a record should be constructed from `token`.
    ///
    /// Only a non-numeric token in canonical GUID form touches storage: one
    /// lookup on the GUID column, hydrating `record` when a row matches.
    /// Absent tokens, collections, digit strings and malformed strings all
    /// yield [`Construction::Proceed`] without a storage call.
    #[instrument(skip(self, record, token), fields(table = record.table_name()), err)]
    pub fn dispatch_construction<R: Record>(
        &self,
        record: &mut R,
        token: &LookupToken,
    ) -> GuidResult<Construction> {
        match token.classify() {
            TokenKind::Guid(guid) => {
                let found =
                    self.find_by_guid(record.table_name(), record.primary_key_column(), &guid)?;
                let primary_key = found.as_ref().map(|row| row.primary_key);
                if let Some(row) = found {
                    record.hydrate(row);
                }
                debug!(%guid, found = primary_key.is_some(), "constructed by GUID");
                Ok(Construction::Loaded { primary_key })
            }
            TokenKind::Unrecognized(raw) => {
                debug!(token = %raw, "token is neither a primary key nor a GUID");
                Ok(Construction::Proceed)
            }
            TokenKind::Absent | TokenKind::Collection | TokenKind::PrimaryKey(_) => {
                Ok(Construction::Proceed)
            }
        }
    }

    /// Fetch the row of `table` whose GUID column equals `guid`.
    ///
    /// `guid` is bound exactly as given. Stored values are compared as
    /// strings, so case must match.
    pub fn find_by_guid(
        &self,
        table: &str,
        key_column: &str,
        guid: &str,
    ) -> GuidResult<Option<Row>> {
        let query = SelectOne::new(table, key_column, self.config.column.as_str(), guid);
        Ok(self.executor.find_one(&query)?)
    }
}

impl<R, E, N, S> OnConstruct<R> for GuidBehavior<E, N, S>
where
    R: Record,
    E: QueryExecutor,
    N: NoticeSink,
    S: RandomSource,
{
    type Error = GuidError;

    fn on_construct(&self, record: &mut R, token: &LookupToken) -> GuidResult<Construction> {
        self.dispatch_construction(record, token)
    }
}

impl<R, E, N, S> OnCreate<R> for GuidBehavior<E, N, S>
where
    R: Record,
    E: QueryExecutor,
    N: NoticeSink,
    S: RandomSource,
{
    type Error = GuidError;

    fn on_create(&self, record: &mut R) -> GuidResult<()> {
        self.ensure_identifier(record)
    }
}

impl<R, E, N, S> OnUpdate<R> for GuidBehavior<E, N, S>
where
    R: Record,
    E: QueryExecutor,
    N: NoticeSink,
    S: RandomSource,
{
    type Error = GuidError;

    fn on_update(&self, record: &mut R) -> GuidResult<()> {
        self.ensure_identifier(record)
    }
}
