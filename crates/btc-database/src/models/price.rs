//! Daily bitcoin quote rows

use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::connection::DatabaseConnection;
use crate::schema::bitcoin;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = bitcoin)]
#[diesel(primary_key(date))]
#[diesel(check_for_backend(diesel::pg::Pg, diesel::sqlite::Sqlite))]
pub struct BitcoinPrice {
  pub date: NaiveDate,
  pub open: Option<f64>,
  pub high: Option<f64>,
  pub low: Option<f64>,
  pub close: Option<f64>,
  pub volume: Option<f64>,
  pub marketcap: Option<f64>,
}

#[derive(Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = bitcoin)]
pub struct NewBitcoinPrice {
  pub date: NaiveDate,
  pub open: Option<f64>,
  pub high: Option<f64>,
  pub low: Option<f64>,
  pub close: Option<f64>,
  pub volume: Option<f64>,
  pub marketcap: Option<f64>,
}

impl NewBitcoinPrice {
  /// A row with only the key set
  pub fn empty(date: NaiveDate) -> Self {
    Self { date, open: None, high: None, low: None, close: None, volume: None, marketcap: None }
  }

  /// Insert one row. A second row for the same date fails on the primary key.
  pub fn insert(&self, conn: &mut DatabaseConnection) -> Result<usize, diesel::result::Error> {
    let query = diesel::insert_into(bitcoin::table).values(self);
    match conn {
      DatabaseConnection::Postgres(c) => query.execute(c),
      DatabaseConnection::Sqlite(c) => query.execute(c),
    }
  }
}

impl BitcoinPrice {
  pub fn find_by_date(
    conn: &mut DatabaseConnection,
    day: NaiveDate,
  ) -> Result<Option<Self>, diesel::result::Error> {
    // `as_select()` pins the backend, so each arm builds its own query
    crate::with_connection!(conn, |c| bitcoin::table
      .find(day)
      .select(BitcoinPrice::as_select())
      .first(c)
      .optional())
  }

  /// Rows with `start <= date <= end`, oldest first
  pub fn range(
    conn: &mut DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Self>, diesel::result::Error> {
    crate::with_connection!(conn, |c| bitcoin::table
      .filter(bitcoin::date.between(start, end))
      .order(bitcoin::date.asc())
      .select(BitcoinPrice::as_select())
      .load(c))
  }
}
