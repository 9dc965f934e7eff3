// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_fixture(sections: usize) -> String {
    let mut source = String::from("document<");
    for section in 0..sections {
        source.push_str(&format!("h2<'Section {section}'>"));
        source.push_str("p<'Paragraph with ' (em)'some' ' content.'>");
        source.push_str("ul<li<p<'Bullet point'> ul<li<'Nested item'>>> li<p<'Another item'>>>");
    }
    source.push('>');
    source
}
