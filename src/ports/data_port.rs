//! Market data port trait.

use crate::domain::error::DuelError;
use crate::domain::period::Period;
use crate::domain::series::InstrumentSeries;
use chrono::NaiveDate;
use std::collections::HashMap;

pub trait MarketDataPort {
    /// Daily prices for `symbols` over `period`.
    ///
    /// Symbols the source has nothing for are left out of the map rather than
    /// failing the whole request; an unreachable source is `DataFetch`.
    fn fetch_daily_prices(
        &self,
        symbols: &[String],
        period: Period,
    ) -> Result<HashMap<String, InstrumentSeries>, DuelError>;

    /// (first date, last date, observation count) for everything the source
    /// holds on `symbol`.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DuelError>;
}
