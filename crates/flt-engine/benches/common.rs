// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_flt_document(sections: usize) -> String {
    let mut source = String::from(
        "0003 0 text/vnd.ficlab.flt\n0003 1 1\n0003 2 1\n0003 3 title Benchmark\n0003 3 creator Criterion\n",
    );

    for section in 0..sections {
        source.push_str("0062 1\n");
        source.push_str(&format!("0021 Section {section}\n"));
        source.push_str("0002 2\n");
        source.push_str("0001 A paragraph with enough words to need wrapping once it is rendered\n");
        source.push_str("0000  again, escaped\\nnewlines and \\\\ backslashes included.\n");
        source.push_str("0012 9\n");
        source.push_str("0011 A note about the paragraph.\n");
        source.push_str("0002 9\n");
        if section % 4 == 0 {
            source.push_str("0022 9\n0001 cell\n0122 9\n0001 header cell\n0002 9\n");
        }
    }

    source
}
