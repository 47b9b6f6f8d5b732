/// Builds a full adder out of two half adders and an OR gate, prints its
/// truth table and the exported template.
///
/// Run with `RUST_LOG=debug` to see instantiation and pass boundaries.
use wiresim::{pin_values, ComponentLibrary, ComponentTemplate, Endpoint, Evaluator, PinType};

fn half_adder() -> ComponentTemplate {
    ComponentTemplate::new("half_adder")
        .input("A", 1, PinType::Bool)
        .input("B", 1, PinType::Bool)
        .output("Sum", 1, PinType::Unsigned)
        .output("Cout", 1, PinType::Unsigned)
        .component("xor1", "xor")
        .component("and1", "and")
        .wire("a_xor", Endpoint::boundary("A"), Endpoint::child("xor1", "A"))
        .wire("b_xor", Endpoint::boundary("B"), Endpoint::child("xor1", "B"))
        .wire("a_and", Endpoint::boundary("A"), Endpoint::child("and1", "A"))
        .wire("b_and", Endpoint::boundary("B"), Endpoint::child("and1", "B"))
        .wire("sum", Endpoint::child("xor1", "Out"), Endpoint::boundary("Sum"))
        .wire("cout", Endpoint::child("and1", "Out"), Endpoint::boundary("Cout"))
}

fn full_adder() -> ComponentTemplate {
    ComponentTemplate::new("full_adder")
        .input("Cin", 1, PinType::Bool)
        .input("A", 1, PinType::Bool)
        .input("B", 1, PinType::Bool)
        .output("Sum", 1, PinType::Unsigned)
        .output("Cout", 1, PinType::Unsigned)
        .component("ha1", "half_adder")
        .component("ha2", "half_adder")
        .component("or1", "or")
        .wire("a", Endpoint::boundary("A"), Endpoint::child("ha1", "A"))
        .wire("b", Endpoint::boundary("B"), Endpoint::child("ha1", "B"))
        .wire("partial", Endpoint::child("ha1", "Sum"), Endpoint::child("ha2", "A"))
        .wire("cin", Endpoint::boundary("Cin"), Endpoint::child("ha2", "B"))
        .wire("c1", Endpoint::child("ha1", "Cout"), Endpoint::child("or1", "A"))
        .wire("c2", Endpoint::child("ha2", "Cout"), Endpoint::child("or1", "B"))
        .wire("sum", Endpoint::child("ha2", "Sum"), Endpoint::boundary("Sum"))
        .wire("cout", Endpoint::child("or1", "Out"), Endpoint::boundary("Cout"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut library = ComponentLibrary::with_builtins();
    library.register_template(half_adder());
    library.register_template(full_adder());

    let mut adder = library.generate("full_adder", "adder")?;
    let mut evaluator = Evaluator::default();

    println!("Cin A B | Sum Cout | passes");
    for bits in 0..8i64 {
        let (cin, a, b) = ((bits >> 2) & 1, (bits >> 1) & 1, bits & 1);
        let inputs = pin_values(&[("Cin", cin), ("A", a), ("B", b)]);
        let report = evaluator.evaluate_with_inputs(&mut adder, &inputs)?.into_result()?;
        let outputs = adder.get_output_values();
        println!(
            "  {}   {} {} |  {}    {}  | {}",
            cin, a, b, outputs["Sum"], outputs["Cout"], report.passes
        );
    }

    println!("{}", serde_json::to_string_pretty(&adder.export_template())?);
    Ok(())
}
