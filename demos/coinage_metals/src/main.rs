// Coinage Metals Example — the smallest possible list dataset
//
// Three "structures", each a single atom of copper, silver or gold at the
// origin with zero energy. The item list holds only the element symbols; the
// reader turns a symbol into a record.
//
// This example demonstrates:
//   1. Writing a reader function
//   2. Building a list loader with and without an explicit schema
//   3. Taking the default "train" subset
//   4. Sparse batching with the per-atom structure index

use molset::element;
use molset::prelude::*;

fn read_atom(symbol: &&str) -> std::result::Result<Record, String> {
    let z = element::atomic_number(symbol).ok_or_else(|| format!("unknown element '{symbol}'"))?;
    Ok(Record::new()
        .with(ELEMS, Value::vector(&[i64::from(z)]))
        .with(COORD, Value::rows3(&[[0.0, 0.0, 0.0]]))
        .with(E_DATA, Value::scalar(0.0f64)))
}

fn main() -> molset::Result<()> {
    println!("=== molset — Coinage Metals Example ===");
    println!();

    // 1. Default schema: elems, coord, e_data
    let loader = list_loader(ListLoaderConfig::default(), read_atom);
    println!("Schema: {}", loader.schema().to_json()?);

    let splits = loader.load_split(vec!["Cu", "Ag", "Au"], &SplitConfig::default())?;
    let train = splits.subset(TRAIN)?;
    for (i, record) in train.iter().enumerate() {
        let record = record?;
        let z = record.get(ELEMS).map(|v| v.to_vec::<i32>()).transpose()?;
        let coord = record.get(COORD).map(|v| v.shape().to_string());
        println!("  record {i}: elems={z:?} coord shape={coord:?}");
    }
    println!();

    // 2. Explicit schema from a JSON descriptor, energies kept in float64
    let format = Schema::from_json(
        r#"{
            "elems":  {"dtype": "int32",   "shape": ["atoms"]},
            "coord":  {"dtype": "float32", "shape": ["atoms", 3]},
            "e_data": {"dtype": "float64", "shape": []}
        }"#,
    )?;
    let loader = list_loader(ListLoaderConfig::default().format(format), read_atom);
    let dataset = loader.load(vec!["Cu", "Ag", "Au"]);

    // 3. Batches of two structures
    let mut batches = BatchLoader::new(&dataset, BatchConfig::default().batch_size(2));
    println!("Batches: {}", batches.num_batches());
    for (i, batch) in batches.iter_batches().enumerate() {
        let batch = batch?;
        for (name, value) in &batch {
            println!("  batch {i}: {name:<7} {} {}", value.dtype(), value.shape());
        }
    }
    println!();

    // 4. A bad item surfaces as an error at its position
    let broken = list_loader(ListLoaderConfig::default(), read_atom).load(vec!["Cu", "Xx"]);
    for record in broken.iter() {
        match record {
            Ok(_) => println!("  ok"),
            Err(e) => println!("  error: {e}"),
        }
    }

    Ok(())
}
