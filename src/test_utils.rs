/// # Test Utilities Module
///
/// Shared fixtures for unit tests: isolated in-memory stores shaped like the
/// ingested traffic tables, with deterministic sample data.

use crate::core::{Result, TrafficError};
use rusqlite::{params, Connection};

/// First year of the national series; the fixture holds 75 consecutive years.
pub const UK_FIRST_YEAR: i64 = 1949;
pub const UK_YEARS: i64 = 75;

/// Isolated database test fixture
pub struct DatabaseFixture {
    pub connection: Connection,
}

impl DatabaseFixture {
    /// Create an empty in-memory store
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(TrafficError::Database)?;
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(DatabaseFixture { connection })
    }

    /// Create fixture with the three traffic tables populated
    pub fn with_sample_data() -> Result<Self> {
        let mut fixture = Self::new()?;
        fixture.setup_standard_schema()?;
        fixture.populate_sample_data()?;
        Ok(fixture)
    }

    /// Set up the `uk`, `london_cars` and `london_all` tables
    pub fn setup_standard_schema(&mut self) -> Result<()> {
        self.connection.execute_batch(
            "
            CREATE TABLE uk (
                year INTEGER,
                cars REAL,
                light_commercial_vehicles REAL,
                heavy_goods_vehicles REAL,
                all_motor_vehicles REAL
            );

            CREATE TABLE london_cars (
                borough_id INTEGER,
                borough_name TEXT,
                la_code TEXT,
                year INTEGER,
                cars REAL
            );

            CREATE TABLE london_all (
                borough_id INTEGER,
                borough_name TEXT,
                year INTEGER,
                all_motor_vehicles REAL
            );
        ",
        )?;
        Ok(())
    }

    /// Populate with deterministic sample data
    pub fn populate_sample_data(&mut self) -> Result<()> {
        let tx = self.connection.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO uk (year, cars, light_commercial_vehicles, heavy_goods_vehicles, all_motor_vehicles)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for year in UK_FIRST_YEAR..UK_FIRST_YEAR + UK_YEARS {
                let offset = (year - UK_FIRST_YEAR) as f64;
                let cars = 20.0 + offset * 5.5;
                let lcv = 5.0 + offset * 1.25;
                let hgv = 10.0 + offset * 0.5;
                stmt.execute(params![year, cars, lcv, hgv, cars + lcv + hgv])?;
            }
        }
        tx.execute_batch(
            "
            INSERT INTO london_cars VALUES (1, 'Camden', 'E09000007', 2019, 540.5);
            INSERT INTO london_cars VALUES (1, 'Camden', 'E09000007', 2020, 410.25);
            INSERT INTO london_cars VALUES (2, 'Hackney', 'E09000012', 2019, 380.0);

            INSERT INTO london_all VALUES (1, 'Camden', 2019, 700.5);
            INSERT INTO london_all VALUES (1, 'Camden', 2020, 560.0);
            INSERT INTO london_all VALUES (2, 'Hackney', 2019, 480.75);
            INSERT INTO london_all VALUES (2, 'Hackney', 2020, 402.5);
            INSERT INTO london_all VALUES (3, 'Westminster', 2020, 820.0);
        ",
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_row_counts() {
        let fixture = DatabaseFixture::with_sample_data().unwrap();
        let count = |table: &str| -> i64 {
            fixture
                .connection
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .unwrap()
        };
        assert_eq!(count("uk"), UK_YEARS);
        assert_eq!(count("london_cars"), 3);
        assert_eq!(count("london_all"), 5);
    }
}
