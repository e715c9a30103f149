//! Helpers shared by the integration tests: reading tables back out of
//! generated C source.

#![allow(dead_code)]

fn defines(line: &str, symbol: &str) -> bool {
    line.starts_with("static const")
        && (line.contains(&format!(" {symbol}[")) || line.contains(&format!(" {symbol} =")))
}

/// Values of table `symbol`, independent of line wrapping.
pub fn table_values(text: &str, symbol: &str) -> Vec<String> {
    let mut lines = text.lines().skip_while(|line| !defines(line, symbol));
    assert!(lines.next().is_some(), "table {symbol} not found");

    let mut values = Vec::new();
    for line in lines {
        if line.starts_with("};") {
            return values;
        }
        let body = line.split("/*").next().unwrap_or("");
        values.extend(
            body.split(|c: char| c == ',' || c == '{' || c == '}' || c.is_whitespace())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        );
    }
    panic!("table {symbol} is not terminated");
}

/// Number of definitions of `symbol` in `text`.
pub fn definition_count(text: &str, symbol: &str) -> usize {
    text.lines().filter(|line| defines(line, symbol)).count()
}
