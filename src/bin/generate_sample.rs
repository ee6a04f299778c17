//! Writes a pair of sample CSV files for trying out the comparator:
//! `sample_first.csv` and `sample_second.csv` share most amounts but each
//! carries a handful of orphan values the other lacks.

fn main() {
    write_csv(
        "sample_first.csv",
        &["invoice", "description", "net", "tax", "gross"],
        &[
            &["INV-1001", "widgets", "120.00", "25.20", "145.20"],
            &["INV-1002", "gadgets", "89.50", "18.80", "108.30"],
            &["INV-1003", "fasteners", "42.75", "8.98", "51.73"],
            &["INV-1004", "bearings", "310.10", "65.12", "375.22"],
            &["INV-1005", "adjustment", "-12.40", "", "-12.40"],
            &["", "carried forward", "", "", "668.05"],
        ],
    );

    write_csv(
        "sample_second.csv",
        &["ref", "posted", "amount"],
        &[
            // Matches: 120.00, 25.20, 145.20, 89.50, 42.75, 310.10
            &["B-1", "2024-03-01", "120.00"],
            &["B-2", "2024-03-01", "25.20"],
            &["B-3", "2024-03-02", "145.20"],
            &["B-4", "2024-03-04", "89.50"],
            &["B-5", "2024-03-05", "42.75"],
            &["B-6", "2024-03-08", "310.10"],
            // Orphans on this side: 19.99, 500.00
            &["B-7", "2024-03-09", "19.99"],
            &["B-8", "2024-03-11", "500.00"],
        ],
    );

    println!("Wrote sample_first.csv and sample_second.csv");
}

fn write_csv(path: &str, header: &[&str], rows: &[&[&str]]) {
    let mut writer = csv::Writer::from_path(path).expect("create sample file");
    writer.write_record(header).expect("write header");
    for row in rows {
        writer.write_record(*row).expect("write row");
    }
    writer.flush().expect("flush sample file");
}
