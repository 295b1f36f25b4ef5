use std::sync::atomic::{AtomicU64, Ordering};

use super::registry::SystemTableId;

/// Materialization counters for one system table, shared by all sessions
#[derive(Debug, Default)]
pub struct TableStats {
    hits: AtomicU64,
    rebuilds: AtomicU64,
    committed: AtomicU64,
    discarded: AtomicU64,
}

impl TableStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_committed(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn status(&self, id: SystemTableId, cacheable: bool) -> CacheStatus {
        let hits = self.hits.load(Ordering::Relaxed);
        let rebuilds = self.rebuilds.load(Ordering::Relaxed);
        let requests = hits + rebuilds;
        CacheStatus {
            table: id,
            cacheable,
            hits,
            rebuilds,
            rows_committed: self.committed.load(Ordering::Relaxed),
            rows_discarded: self.discarded.load(Ordering::Relaxed),
            hit_rate: if requests > 0 {
                (hits as f64 / requests as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Snapshot of a table's counters
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub table: SystemTableId,
    pub cacheable: bool,
    pub hits: u64,
    pub rebuilds: u64,
    pub rows_committed: u64,
    pub rows_discarded: u64,
    pub hit_rate: f64,
}

/// Formats statuses as a header plus text rows for the CLI
pub fn format_cache_status_as_table(statuses: &[CacheStatus]) -> (Vec<String>, Vec<Vec<String>>) {
    let columns = ["table", "cacheable", "hits", "rebuilds", "committed", "discarded", "hit_rate_percent"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = statuses
        .iter()
        .filter(|s| s.hits + s.rebuilds > 0)
        .map(|s| {
            vec![
                s.table.name().to_string(),
                s.cacheable.to_string(),
                s.hits.to_string(),
                s.rebuilds.to_string(),
                s.rows_committed.to_string(),
                s.rows_discarded.to_string(),
                format!("{:.1}", s.hit_rate),
            ]
        })
        .collect();

    (columns, rows)
}

/// Logs aggregate cache behaviour
pub fn log_cache_status(statuses: &[CacheStatus]) {
    let hits: u64 = statuses.iter().map(|s| s.hits).sum();
    let rebuilds: u64 = statuses.iter().map(|s| s.rebuilds).sum();
    let discarded: u64 = statuses.iter().map(|s| s.rows_discarded).sum();
    let rate = if hits + rebuilds > 0 {
        (hits as f64 / (hits + rebuilds) as f64) * 100.0
    } else {
        0.0
    };

    tracing::info!(
        "System table cache - Hits: {} ({:.1}%), Rebuilds: {}, Discarded rows: {}",
        hits,
        rate,
        rebuilds,
        discarded
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = TableStats::default();
        stats.record_rebuild();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        let status = stats.status(SystemTableId::Tables, true);
        assert_eq!(status.hits, 3);
        assert_eq!(status.rebuilds, 1);
        assert!((status.hit_rate - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_skips_untouched_tables() {
        let touched = TableStats::default();
        touched.record_rebuild();
        touched.record_committed();
        let statuses = vec![
            touched.status(SystemTableId::Tables, true),
            TableStats::default().status(SystemTableId::Views, true),
        ];
        let (columns, rows) = format_cache_status_as_table(&statuses);
        assert_eq!(columns.len(), 7);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "TABLES");
        assert_eq!(rows[0][4], "1");
    }
}
