// @file: trade_history_py/src/lib.rs
// @description: PyO3 wrapper exposing the blocking Bybit trade fetcher to Python.
// @author: LAS.

use pyo3::exceptions::{PyRuntimeError, PyTimeoutError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use trade_history::core::models::{DEFAULT_BASE_URL, DEFAULT_LIMIT};
use trade_history::{FetchError, TradeRecord};


//
// ERROR MAPPING
//

fn to_py_err(e: FetchError) -> PyErr {
    match e {
        FetchError::InvalidArgument(_) => PyValueError::new_err(e.to_string()),
        FetchError::TimeoutError(_) => PyTimeoutError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

fn trade_to_dict<'py>(py: Python<'py>, trade: &TradeRecord) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    dict.set_item("timestamp", trade.timestamp)?;
    dict.set_item("symbol", trade.symbol.as_str())?;
    dict.set_item("side", trade.side.as_str())?;
    dict.set_item("size", trade.size)?;
    dict.set_item("price", trade.price)?;
    Ok(dict)
}


//
// PYTHON INTERFACE
//

/// Fetch Bybit trade history between two timestamps (unix millis).
///
/// Returns a list of dicts with keys timestamp, symbol, side, size, price,
/// in the order the server returned them. Raises ValueError on bad
/// arguments, TimeoutError on timeouts and RuntimeError otherwise.
#[pyfunction]
#[pyo3(signature = (symbol, start_time, end_time, *, limit = DEFAULT_LIMIT, api_key = "", secret = "", base_url = DEFAULT_BASE_URL))]
#[allow(clippy::too_many_arguments)]
fn fetch_trades(
    py: Python<'_>,
    symbol: &str,
    start_time: i64,
    end_time: i64,
    limit: i64,
    api_key: &str,
    secret: &str,
    base_url: &str,
) -> PyResult<PyObject> {
    // #1. Run the whole paginated fetch without holding the GIL
    let trades = py
        .allow_threads(|| {
            trade_history::fetch_trades(symbol, start_time, end_time, limit, api_key, secret, base_url)
        })
        .map_err(to_py_err)?;

    // #2. Convert to plain Python objects
    let list = PyList::empty(py);
    for trade in &trades {
        list.append(trade_to_dict(py, trade)?)?;
    }

    Ok(list.into())
}

#[pymodule]
fn trade_history_py(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fetch_trades, m)?)?;
    Ok(())
}
