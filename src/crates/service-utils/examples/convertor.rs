//! Example demonstrating string conversions

use service_utils::conv;

fn main() -> anyhow::Result<()> {
    let port: u16 = conv::string_to_integer("8080")?;
    println!("port = {}", conv::integer_to_string(port));

    for input in ["1", "t", "TRUE", "False", "yes"] {
        match conv::string_to_bool(input) {
            Ok(value) => println!("{:>5} -> {}", input, conv::bool_to_string(value)),
            Err(err) => println!("{:>5} -> {}", input, err),
        }
    }

    let ratio = conv::string_to_f64("0.000125")?;
    println!("ratio = {}", conv::f64_to_string(ratio));
    println!("single = {}", conv::f32_to_string(conv::string_to_f32("3.14")?));

    if let Err(err) = conv::string_to_integer::<i8>("300") {
        println!("{}", err);
    }
    Ok(())
}
