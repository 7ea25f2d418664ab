//! printf-style format engine.
//!
//! Interprets a C format string against a slice of typed arguments and
//! renders bytes. Directives support the full flag set (`- + # 0` and
//! space), fixed and `*` width, fixed and `.*` precision, the integer
//! length modifiers (applied as value truncation), and the conversions
//! `d i u o x X c s p f F e E g G %`.
//!
//! The engine is total: a malformed directive, an exhausted argument
//! list, or an argument of the wrong class is rendered as the literal
//! directive text instead of failing. Expansion per directive is bounded,
//! so no format string can grow output unboundedly from one specifier.

/// Hard ceiling on padding from a single directive.
const PAD_LIMIT: usize = 4096;

/// A typed argument for one conversion.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(u8),
    Str(&'a [u8]),
    Ptr(usize),
}

// ---------------------------------------------------------------------------
// Directive model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    alt: bool,
    zero: bool,
}

/// A width or precision amount; `FromArg` consumes the next `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Amount {
    Absent,
    Fixed(usize),
    FromArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Default,
    Hh,
    H,
    L,
    Ll,
    Z,
    T,
    J,
    BigL,
}

#[derive(Debug, Clone, Copy)]
struct Directive {
    flags: Flags,
    width: Amount,
    precision: Amount,
    length: Length,
    conversion: u8,
}

/// Parse one directive starting just past the `%`. Returns the directive
/// and the bytes consumed, or `None` if malformed.
fn parse_directive(fmt: &[u8]) -> Option<(Directive, usize)> {
    let mut pos = 0;

    let mut flags = Flags::default();
    while let Some(&b) = fmt.get(pos) {
        match b {
            b'-' => flags.left = true,
            b'+' => flags.plus = true,
            b' ' => flags.space = true,
            b'#' => flags.alt = true,
            b'0' => flags.zero = true,
            _ => break,
        }
        pos += 1;
    }
    // '+' wins over space; '-' wins over '0'.
    if flags.plus {
        flags.space = false;
    }
    if flags.left {
        flags.zero = false;
    }

    let width = parse_amount(fmt, &mut pos);

    let precision = if fmt.get(pos) == Some(&b'.') {
        pos += 1;
        match parse_amount(fmt, &mut pos) {
            // "%." alone means precision zero.
            Amount::Absent => Amount::Fixed(0),
            a => a,
        }
    } else {
        Amount::Absent
    };

    let length = match fmt.get(pos) {
        Some(b'h') => {
            pos += 1;
            if fmt.get(pos) == Some(&b'h') {
                pos += 1;
                Length::Hh
            } else {
                Length::H
            }
        }
        Some(b'l') => {
            pos += 1;
            if fmt.get(pos) == Some(&b'l') {
                pos += 1;
                Length::Ll
            } else {
                Length::L
            }
        }
        Some(b'z') => {
            pos += 1;
            Length::Z
        }
        Some(b't') => {
            pos += 1;
            Length::T
        }
        Some(b'j') => {
            pos += 1;
            Length::J
        }
        Some(b'L') => {
            pos += 1;
            Length::BigL
        }
        _ => Length::Default,
    };

    let conversion = *fmt.get(pos)?;
    pos += 1;
    match conversion {
        b'd' | b'i' | b'u' | b'o' | b'x' | b'X' | b'c' | b's' | b'p' | b'f' | b'F' | b'e'
        | b'E' | b'g' | b'G' => {}
        _ => return None,
    }

    Some((
        Directive {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        pos,
    ))
}

fn parse_amount(fmt: &[u8], pos: &mut usize) -> Amount {
    if fmt.get(*pos) == Some(&b'*') {
        *pos += 1;
        return Amount::FromArg;
    }
    let start = *pos;
    while fmt.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    if *pos == start {
        return Amount::Absent;
    }
    let mut n = 0usize;
    for &d in &fmt[start..*pos] {
        n = n.saturating_mul(10).saturating_add(usize::from(d - b'0'));
    }
    Amount::Fixed(n)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Render `fmt` against `args` into a fresh byte vector.
pub fn format(fmt: &[u8], args: &[Arg<'_>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(fmt.len());
    let mut args = args.iter().copied();
    let mut pos = 0;

    while pos < fmt.len() {
        let lit_start = pos;
        while pos < fmt.len() && fmt[pos] != b'%' {
            pos += 1;
        }
        out.extend_from_slice(&fmt[lit_start..pos]);
        if pos >= fmt.len() {
            break;
        }

        // At a '%'. A trailing lone '%' is literal.
        let pct = pos;
        pos += 1;
        if pos >= fmt.len() {
            out.push(b'%');
            break;
        }
        if fmt[pos] == b'%' {
            out.push(b'%');
            pos += 1;
            continue;
        }

        match parse_directive(&fmt[pos..]) {
            Some((dir, consumed)) => {
                let end = pos + consumed;
                if !render(&dir, &mut args, &mut out) {
                    // Argument list could not satisfy the directive:
                    // fall back to the raw directive text.
                    out.extend_from_slice(&fmt[pct..end]);
                }
                pos = end;
            }
            None => {
                out.push(b'%');
            }
        }
    }

    out
}

/// Resolve and render one directive. Returns false if the arguments did
/// not satisfy it (nothing is written in that case).
fn render<'a>(
    dir: &Directive,
    args: &mut impl Iterator<Item = Arg<'a>>,
    out: &mut Vec<u8>,
) -> bool {
    let mut flags = dir.flags;

    let width = match dir.width {
        Amount::Absent => 0,
        Amount::Fixed(w) => w,
        Amount::FromArg => match args.next() {
            Some(Arg::Int(w)) => {
                if w < 0 {
                    // Negative dynamic width means left-justify.
                    flags.left = true;
                    flags.zero = false;
                }
                w.unsigned_abs().min(PAD_LIMIT as u64) as usize
            }
            _ => return false,
        },
    };

    let precision = match dir.precision {
        Amount::Absent => None,
        Amount::Fixed(p) => Some(p),
        Amount::FromArg => match args.next() {
            // Negative dynamic precision reads as omitted.
            Some(Arg::Int(p)) if p < 0 => None,
            Some(Arg::Int(p)) => Some(p as usize),
            _ => return false,
        },
    };

    match dir.conversion {
        b'd' | b'i' => {
            let Some(v) = args.next().and_then(arg_as_i64) else {
                return false;
            };
            let v = truncate_signed(v, dir.length);
            let sign = sign_byte(&flags, v < 0);
            render_int(sign, v.unsigned_abs(), dir.conversion, &flags, width, precision, out);
        }
        b'u' | b'o' | b'x' | b'X' => {
            let Some(v) = args.next().and_then(arg_as_u64) else {
                return false;
            };
            let v = truncate_unsigned(v, dir.length);
            render_int(None, v, dir.conversion, &flags, width, precision, out);
        }
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' => {
            let Some(v) = args.next().and_then(arg_as_f64) else {
                return false;
            };
            render_float(v, dir.conversion, &flags, width, precision, out);
        }
        b'c' => {
            let c = match args.next() {
                Some(Arg::Char(c)) => c,
                Some(Arg::Int(v)) => v as u8,
                Some(Arg::Uint(v)) => v as u8,
                _ => return false,
            };
            emit_padded(&[c], &flags, width, false, out);
        }
        b's' => {
            let Some(Arg::Str(s)) = args.next() else {
                return false;
            };
            let cut = precision.map_or(s.len(), |p| p.min(s.len()));
            emit_padded(&s[..cut], &flags, width, false, out);
        }
        b'p' => {
            let addr = match args.next() {
                Some(Arg::Ptr(a)) => a,
                Some(Arg::Uint(a)) => a as usize,
                _ => return false,
            };
            if addr == 0 {
                emit_padded(b"(nil)", &flags, width, false, out);
            } else {
                let mut body = Vec::with_capacity(18);
                body.extend_from_slice(b"0x");
                push_digits(addr as u64, 16, false, &mut body);
                emit_padded(&body, &flags, width, false, out);
            }
        }
        _ => return false,
    }
    true
}

fn arg_as_i64(arg: Arg<'_>) -> Option<i64> {
    match arg {
        Arg::Int(v) => Some(v),
        Arg::Uint(v) => Some(v as i64),
        Arg::Char(c) => Some(i64::from(c)),
        _ => None,
    }
}

fn arg_as_u64(arg: Arg<'_>) -> Option<u64> {
    match arg {
        Arg::Int(v) => Some(v as u64),
        Arg::Uint(v) => Some(v),
        Arg::Char(c) => Some(u64::from(c)),
        Arg::Ptr(p) => Some(p as u64),
        _ => None,
    }
}

fn arg_as_f64(arg: Arg<'_>) -> Option<f64> {
    match arg {
        Arg::Float(v) => Some(v),
        _ => None,
    }
}

fn truncate_signed(v: i64, len: Length) -> i64 {
    match len {
        Length::Hh => i64::from(v as i8),
        Length::H => i64::from(v as i16),
        _ => v,
    }
}

fn truncate_unsigned(v: u64, len: Length) -> u64 {
    match len {
        Length::Hh => u64::from(v as u8),
        Length::H => u64::from(v as u16),
        _ => v,
    }
}

fn sign_byte(flags: &Flags, negative: bool) -> Option<u8> {
    if negative {
        Some(b'-')
    } else if flags.plus {
        Some(b'+')
    } else if flags.space {
        Some(b' ')
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Shared integer renderer for the signed and unsigned conversions; the
/// caller supplies the sign byte (always `None` for unsigned).
fn render_int(
    sign: Option<u8>,
    magnitude: u64,
    conversion: u8,
    flags: &Flags,
    width: usize,
    precision: Option<usize>,
    out: &mut Vec<u8>,
) {
    let (base, upper) = match conversion {
        b'o' => (8, false),
        b'x' => (16, false),
        b'X' => (16, true),
        _ => (10, false),
    };

    let mut digits = Vec::with_capacity(24);
    push_digits(magnitude, base, upper, &mut digits);

    // Precision is a minimum digit count; "%.0u" of zero prints nothing.
    let min_digits = precision.unwrap_or(1);
    let suppress = magnitude == 0 && precision == Some(0);
    let lead_zeros = if suppress {
        0
    } else {
        min_digits.saturating_sub(digits.len())
    };

    let prefix: &[u8] = if flags.alt && magnitude != 0 {
        match conversion {
            b'o' => b"0",
            b'x' => b"0x",
            b'X' => b"0X",
            _ => b"",
        }
    } else {
        b""
    };

    let body_len = usize::from(sign.is_some())
        + prefix.len()
        + lead_zeros
        + if suppress { 0 } else { digits.len() };
    let padding = width.saturating_sub(body_len);

    // An explicit precision disables zero padding for integers.
    let zero_pad = flags.zero && precision.is_none();

    if !flags.left && !zero_pad {
        push_repeat(out, b' ', padding);
    }
    if let Some(s) = sign {
        out.push(s);
    }
    out.extend_from_slice(prefix);
    if !flags.left && zero_pad {
        push_repeat(out, b'0', padding);
    }
    if !suppress {
        push_repeat(out, b'0', lead_zeros);
        out.extend_from_slice(&digits);
    }
    if flags.left {
        push_repeat(out, b' ', padding);
    }
}

fn render_float(
    value: f64,
    conversion: u8,
    flags: &Flags,
    width: usize,
    precision: Option<usize>,
    out: &mut Vec<u8>,
) {
    let upper = conversion.is_ascii_uppercase();
    let prec = precision.unwrap_or(6);

    if value.is_nan() {
        let body: &[u8] = if upper { b"NAN" } else { b"nan" };
        emit_padded(body, flags, width, false, out);
        return;
    }
    if value.is_infinite() {
        let body: &[u8] = match (upper, value > 0.0) {
            (true, true) => b"INF",
            (true, false) => b"-INF",
            (false, true) => b"inf",
            (false, false) => b"-inf",
        };
        emit_padded(body, flags, width, false, out);
        return;
    }

    let negative = value.is_sign_negative();
    let magnitude = value.abs();

    let body = match conversion | 0x20 {
        b'f' => fixed_body(magnitude, prec, flags.alt),
        b'e' => exponent_body(magnitude, prec, upper, flags.alt),
        _ => shortest_body(magnitude, prec, upper, flags.alt),
    };

    let sign = sign_byte(flags, negative);
    let body_len = usize::from(sign.is_some()) + body.len();
    let padding = width.saturating_sub(body_len);

    if !flags.left && !flags.zero {
        push_repeat(out, b' ', padding);
    }
    if let Some(s) = sign {
        out.push(s);
    }
    if !flags.left && flags.zero {
        push_repeat(out, b'0', padding);
    }
    out.extend_from_slice(body.as_bytes());
    if flags.left {
        push_repeat(out, b' ', padding);
    }
}

/// `%f`: fixed-point decimal of a non-negative value.
fn fixed_body(v: f64, prec: usize, alt: bool) -> String {
    let mut body = std::format!("{v:.prec$}");
    if prec == 0 && alt {
        body.push('.');
    }
    body
}

/// `%e`: scientific notation of a non-negative value.
fn exponent_body(v: f64, prec: usize, upper: bool, alt: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    if v == 0.0 {
        let mantissa = fixed_body(0.0, prec, alt);
        return std::format!("{mantissa}{e}+00");
    }
    let mut exp = v.log10().floor() as i32;
    let mut mantissa = v / 10f64.powi(exp);
    // Rounding at the requested precision can carry into a new decade.
    if std::format!("{mantissa:.prec$}").starts_with("10") {
        exp += 1;
        mantissa = v / 10f64.powi(exp);
    }
    let mantissa = fixed_body(mantissa, prec, alt);
    let sign = if exp < 0 { '-' } else { '+' };
    std::format!("{mantissa}{e}{sign}{:02}", exp.unsigned_abs())
}

/// `%g`: the shorter of `%f` and `%e`, trailing zeros trimmed.
fn shortest_body(v: f64, prec: usize, upper: bool, alt: bool) -> String {
    let p = prec.max(1);
    let exp = if v == 0.0 {
        0
    } else {
        v.log10().floor() as i32
    };

    let mut body = if exp >= -4 && exp < p as i32 {
        let frac = (p as i32 - 1 - exp).max(0) as usize;
        fixed_body(v, frac, false)
    } else {
        exponent_body(v, p - 1, upper, false)
    };

    if !alt {
        trim_trailing_zeros(&mut body);
    }
    body
}

fn trim_trailing_zeros(s: &mut String) {
    let Some(dot) = s.find('.') else { return };
    let tail_start = s[dot..]
        .find(['e', 'E'])
        .map_or(s.len(), |off| dot + off);
    let mantissa_end = s[dot..tail_start]
        .trim_end_matches('0')
        .trim_end_matches('.')
        .len()
        + dot;
    s.replace_range(mantissa_end..tail_start, "");
}

// ---------------------------------------------------------------------------
// Emission helpers
// ---------------------------------------------------------------------------

fn emit_padded(body: &[u8], flags: &Flags, width: usize, zero_pad: bool, out: &mut Vec<u8>) {
    let padding = width.saturating_sub(body.len());
    let fill = if zero_pad { b'0' } else { b' ' };
    if !flags.left {
        push_repeat(out, fill, padding);
    }
    out.extend_from_slice(body);
    if flags.left {
        push_repeat(out, b' ', padding);
    }
}

fn push_repeat(out: &mut Vec<u8>, byte: u8, count: usize) {
    out.resize(out.len() + count.min(PAD_LIMIT), byte);
}

/// Append `value` in `base`, most significant digit first.
fn push_digits(mut value: u64, base: u64, upper: bool, out: &mut Vec<u8>) {
    let alpha = if upper { b'A' } else { b'a' };
    let start = out.len();
    loop {
        let d = (value % base) as u8;
        out.push(if d < 10 { b'0' + d } else { alpha + d - 10 });
        value /= base;
        if value == 0 {
            break;
        }
    }
    out[start..].reverse();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
