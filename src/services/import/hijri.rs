//! Hijri to Gregorian conversion
//!
//! Uses the Umm al-Qura calendar of Saudi Arabia. Month lengths come from an
//! observation-based table, so each supported year is looked up rather than
//! computed: the table holds which months have 30 days and the Gregorian
//! date of 1 Muharram.

use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Supported Hijri years, the span covered by the Umm al-Qura table
pub const MIN_YEAR: i64 = 1343;
pub const MAX_YEAR: i64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HijriError {
    #[error("Hijri year {0} is outside the supported range 1343-1500")]
    YearOutOfRange(i64),
    #[error("Invalid Hijri month {0}")]
    InvalidMonth(i64),
    #[error("Invalid day {day} for Hijri month {month} of {year}")]
    InvalidDay { year: i64, month: i64, day: i64 },
}

/// One entry per year from MIN_YEAR: month-length bits (bit 11 is Muharram,
/// a set bit means 30 days) and 1 Muharram as Gregorian year, month, day.
#[rustfmt::skip]
const UMM_AL_QURA: [(u16, i32, u32, u32); (MAX_YEAR - MIN_YEAR + 1) as usize] = [
    (0x956, 1924, 8, 2), // 1343
    (0xACA, 1925, 7, 22), // 1344
    (0xBA4, 1926, 7, 11), // 1345
    (0xBD2, 1927, 6, 30), // 1346
    (0x5D9, 1928, 6, 19), // 1347
    (0x2DC, 1929, 6, 9), // 1348
    (0x96D, 1930, 5, 29), // 1349
    (0x54D, 1931, 5, 19), // 1350
    (0xAA5, 1932, 5, 7), // 1351
    (0xB52, 1933, 4, 26), // 1352
    (0xBA5, 1934, 4, 15), // 1353
    (0x5B4, 1935, 4, 5), // 1354
    (0x9B6, 1936, 3, 24), // 1355
    (0x557, 1937, 3, 14), // 1356
    (0x297, 1938, 3, 4), // 1357
    (0x54B, 1939, 2, 21), // 1358
    (0x6A3, 1940, 2, 10), // 1359
    (0x752, 1941, 1, 29), // 1360
    (0xB65, 1942, 1, 18), // 1361
    (0x56A, 1943, 1, 8), // 1362
    (0xAAB, 1943, 12, 28), // 1363
    (0x52B, 1944, 12, 17), // 1364
    (0xC95, 1945, 12, 6), // 1365
    (0xD4A, 1946, 11, 25), // 1366
    (0xDA5, 1947, 11, 14), // 1367
    (0x5CA, 1948, 11, 3), // 1368
    (0xAD6, 1949, 10, 23), // 1369
    (0x957, 1950, 10, 13), // 1370
    (0x4AB, 1951, 10, 3), // 1371
    (0x94B, 1952, 9, 21), // 1372
    (0xAA5, 1953, 9, 10), // 1373
    (0xB52, 1954, 8, 30), // 1374
    (0xB6A, 1955, 8, 19), // 1375
    (0x575, 1956, 8, 8), // 1376
    (0x276, 1957, 7, 29), // 1377
    (0x8B7, 1958, 7, 18), // 1378
    (0x45B, 1959, 7, 8), // 1379
    (0x555, 1960, 6, 26), // 1380
    (0x5A9, 1961, 6, 15), // 1381
    (0x5B4, 1962, 6, 4), // 1382
    (0x9DA, 1963, 5, 24), // 1383
    (0x4DD, 1964, 5, 13), // 1384
    (0x26E, 1965, 5, 3), // 1385
    (0x936, 1966, 4, 22), // 1386
    (0xAAA, 1967, 4, 11), // 1387
    (0xD54, 1968, 3, 30), // 1388
    (0xDB2, 1969, 3, 19), // 1389
    (0x5D5, 1970, 3, 9), // 1390
    (0x2DA, 1971, 2, 27), // 1391
    (0x95B, 1972, 2, 16), // 1392
    (0x4AB, 1973, 2, 5), // 1393
    (0xA55, 1974, 1, 25), // 1394
    (0xB49, 1975, 1, 14), // 1395
    (0xB64, 1976, 1, 3), // 1396
    (0xB71, 1976, 12, 22), // 1397
    (0x5B4, 1977, 12, 12), // 1398
    (0xAB5, 1978, 12, 1), // 1399
    (0xA55, 1979, 11, 21), // 1400
    (0xD25, 1980, 11, 9), // 1401
    (0xE92, 1981, 10, 29), // 1402
    (0xEC9, 1982, 10, 18), // 1403
    (0x6D4, 1983, 10, 8), // 1404
    (0xAE9, 1984, 9, 26), // 1405
    (0x96B, 1985, 9, 16), // 1406
    (0x4AB, 1986, 9, 6), // 1407
    (0xA93, 1987, 8, 26), // 1408
    (0xD49, 1988, 8, 14), // 1409
    (0xDA4, 1989, 8, 3), // 1410
    (0xDB2, 1990, 7, 23), // 1411
    (0xAB9, 1991, 7, 13), // 1412
    (0x4BA, 1992, 7, 2), // 1413
    (0xA5B, 1993, 6, 21), // 1414
    (0x52B, 1994, 6, 11), // 1415
    (0xA95, 1995, 5, 31), // 1416
    (0xB2A, 1996, 5, 19), // 1417
    (0xB55, 1997, 5, 8), // 1418
    (0x55C, 1998, 4, 28), // 1419
    (0x4BD, 1999, 4, 17), // 1420
    (0x23D, 2000, 4, 6), // 1421
    (0x91D, 2001, 3, 26), // 1422
    (0xA95, 2002, 3, 15), // 1423
    (0xB4A, 2003, 3, 4), // 1424
    (0xB5A, 2004, 2, 21), // 1425
    (0x56D, 2005, 2, 10), // 1426
    (0x2B6, 2006, 1, 31), // 1427
    (0x93B, 2007, 1, 20), // 1428
    (0x49B, 2008, 1, 10), // 1429
    (0x655, 2008, 12, 29), // 1430
    (0x6A9, 2009, 12, 18), // 1431
    (0x754, 2010, 12, 7), // 1432
    (0xB6A, 2011, 11, 26), // 1433
    (0x56C, 2012, 11, 15), // 1434
    (0xAAD, 2013, 11, 4), // 1435
    (0x555, 2014, 10, 25), // 1436
    (0xB29, 2015, 10, 14), // 1437
    (0xB92, 2016, 10, 2), // 1438
    (0xBA9, 2017, 9, 21), // 1439
    (0x5D4, 2018, 9, 11), // 1440
    (0xADA, 2019, 8, 31), // 1441
    (0x55A, 2020, 8, 20), // 1442
    (0xAAB, 2021, 8, 9), // 1443
    (0x595, 2022, 7, 30), // 1444
    (0x749, 2023, 7, 19), // 1445
    (0x764, 2024, 7, 7), // 1446
    (0xBAA, 2025, 6, 26), // 1447
    (0x5B5, 2026, 6, 16), // 1448
    (0x2B6, 2027, 6, 6), // 1449
    (0xA56, 2028, 5, 25), // 1450
    (0xE4D, 2029, 5, 14), // 1451
    (0xB25, 2030, 5, 4), // 1452
    (0xB52, 2031, 4, 23), // 1453
    (0xB6A, 2032, 4, 11), // 1454
    (0x5AD, 2033, 4, 1), // 1455
    (0x2AE, 2034, 3, 22), // 1456
    (0x92F, 2035, 3, 11), // 1457
    (0x497, 2036, 2, 29), // 1458
    (0x64B, 2037, 2, 17), // 1459
    (0x6A5, 2038, 2, 6), // 1460
    (0x6AC, 2039, 1, 26), // 1461
    (0xAD6, 2040, 1, 15), // 1462
    (0x55D, 2041, 1, 4), // 1463
    (0x49D, 2041, 12, 25), // 1464
    (0xA4D, 2042, 12, 14), // 1465
    (0xD16, 2043, 12, 3), // 1466
    (0xD95, 2044, 11, 21), // 1467
    (0x5AA, 2045, 11, 11), // 1468
    (0x5B5, 2046, 10, 31), // 1469
    (0x2DA, 2047, 10, 21), // 1470
    (0x95B, 2048, 10, 9), // 1471
    (0x4AD, 2049, 9, 29), // 1472
    (0x595, 2050, 9, 18), // 1473
    (0x6CA, 2051, 9, 7), // 1474
    (0x6E4, 2052, 8, 26), // 1475
    (0xAEA, 2053, 8, 15), // 1476
    (0x4F5, 2054, 8, 5), // 1477
    (0x2B6, 2055, 7, 26), // 1478
    (0x956, 2056, 7, 14), // 1479
    (0xAAA, 2057, 7, 3), // 1480
    (0xB54, 2058, 6, 22), // 1481
    (0xBD2, 2059, 6, 11), // 1482
    (0x5D9, 2060, 5, 31), // 1483
    (0x2EA, 2061, 5, 21), // 1484
    (0x96D, 2062, 5, 10), // 1485
    (0x4AD, 2063, 4, 30), // 1486
    (0xA95, 2064, 4, 18), // 1487
    (0xB4A, 2065, 4, 7), // 1488
    (0xBA5, 2066, 3, 27), // 1489
    (0x5B2, 2067, 3, 17), // 1490
    (0x9B5, 2068, 3, 5), // 1491
    (0x4D6, 2069, 2, 23), // 1492
    (0xA97, 2070, 2, 12), // 1493
    (0x547, 2071, 2, 2), // 1494
    (0x693, 2072, 1, 22), // 1495
    (0x749, 2073, 1, 10), // 1496
    (0xB55, 2073, 12, 30), // 1497
    (0x56A, 2074, 12, 20), // 1498
    (0xA6B, 2075, 12, 9), // 1499
    (0x52B, 2076, 11, 28), // 1500
];

struct HijriYear {
    month_bits: u16,
    new_year: NaiveDate,
}

impl HijriYear {
    fn lookup(year: i64) -> Result<Self, HijriError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(HijriError::YearOutOfRange(year));
        }
        let (month_bits, y, m, d) = UMM_AL_QURA[(year - MIN_YEAR) as usize];
        let new_year = NaiveDate::from_ymd_opt(y, m, d).ok_or(HijriError::YearOutOfRange(year))?;
        Ok(Self { month_bits, new_year })
    }

    fn month_length(&self, month: i64) -> i64 {
        if self.month_bits & (1 << (12 - month)) != 0 {
            30
        } else {
            29
        }
    }
}

/// Number of days in a Hijri month
pub fn month_length(year: i64, month: i64) -> Result<i64, HijriError> {
    if !(1..=12).contains(&month) {
        return Err(HijriError::InvalidMonth(month));
    }
    Ok(HijriYear::lookup(year)?.month_length(month))
}

/// Convert a Hijri date to its Gregorian equivalent
pub fn to_gregorian(year: i64, month: i64, day: i64) -> Result<NaiveDate, HijriError> {
    let hijri_year = HijriYear::lookup(year)?;
    if !(1..=12).contains(&month) {
        return Err(HijriError::InvalidMonth(month));
    }
    if day < 1 || day > hijri_year.month_length(month) {
        return Err(HijriError::InvalidDay { year, month, day });
    }

    let days_before_month: i64 = (1..month).map(|m| hijri_year.month_length(m)).sum();
    let offset = (days_before_month + day - 1) as u64;
    hijri_year
        .new_year
        .checked_add_days(Days::new(offset))
        .ok_or(HijriError::YearOutOfRange(year))
}
