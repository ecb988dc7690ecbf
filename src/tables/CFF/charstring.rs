//! Type 2 charstrings: decoding, encoding and a small stack interpreter.
//!
//! Subsetting works on decoded [`CharString`] programs. [`Decompiler`] and
//! [`CharString::compile`] convert from and to the bytecode stored in the
//! CharStrings and Subrs INDEXes, for the container codec on either side of
//! a subsetting run.
use crate::error::{Result, SubsetError};
use std::convert::TryFrom;

/// Type 2 operators. Escaped (two-byte) operators are `0x0c00 | byte`.
#[allow(missing_docs)]
pub mod op {
    pub const HSTEM: u16 = 1;
    pub const VSTEM: u16 = 3;
    pub const VMOVETO: u16 = 4;
    pub const RLINETO: u16 = 5;
    pub const HLINETO: u16 = 6;
    pub const VLINETO: u16 = 7;
    pub const RRCURVETO: u16 = 8;
    pub const CALLSUBR: u16 = 10;
    pub const RETURN: u16 = 11;
    pub const ESCAPE: u16 = 12;
    pub const ENDCHAR: u16 = 14;
    pub const HSTEMHM: u16 = 18;
    pub const HINTMASK: u16 = 19;
    pub const CNTRMASK: u16 = 20;
    pub const RMOVETO: u16 = 21;
    pub const HMOVETO: u16 = 22;
    pub const VSTEMHM: u16 = 23;
    pub const RCURVELINE: u16 = 24;
    pub const RLINECURVE: u16 = 25;
    pub const VVCURVETO: u16 = 26;
    pub const HHCURVETO: u16 = 27;
    pub const SHORTINT: u16 = 28;
    pub const CALLGSUBR: u16 = 29;
    pub const VHCURVETO: u16 = 30;
    pub const HVCURVETO: u16 = 31;
    pub const HFLEX: u16 = 0x0c00 | 34;
    pub const FLEX: u16 = 0x0c00 | 35;
    pub const HFLEX1: u16 = 0x0c00 | 36;
    pub const FLEX1: u16 = 0x0c00 | 37;
}

/// Subroutine nesting allowed by the Type 2 format.
pub const MAX_SUBR_NESTING: usize = 10;

/// One element of a decoded charstring program.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An integer operand
    Int(i32),
    /// A 16.16 fixed-point operand, stored raw
    Fixed(i32),
    /// An operator
    Operator(u16),
    /// The mask bytes following a `hintmask` or `cntrmask` operator
    Mask(Vec<u8>),
}

impl Token {
    /// Makes an operand token, preferring the integer encoding.
    pub fn number(value: f64) -> Token {
        if value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
            Token::Int(value as i32)
        } else {
            Token::Fixed((value * 65536.0).round() as i32)
        }
    }

    /// The value of an operand token.
    pub fn value(&self) -> Option<f64> {
        match self {
            Token::Int(i) => Some(*i as f64),
            Token::Fixed(f) => Some(*f as f64 / 65536.0),
            _ => None,
        }
    }

    /// Returns true for operators; operands and mask bytes are not.
    pub fn is_operator(&self) -> bool {
        matches!(self, Token::Operator(_))
    }
}

/// Returns true for the operators which define stem hints.
pub fn is_stem(operator: u16) -> bool {
    matches!(
        operator,
        op::HSTEM | op::VSTEM | op::HSTEMHM | op::VSTEMHM
    )
}

/// Returns true for the mask operators, which are followed by mask bytes.
pub fn is_mask(operator: u16) -> bool {
    operator == op::HINTMASK || operator == op::CNTRMASK
}

/// A decoded Type 2 charstring.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharString {
    /// The program, in order.
    pub program: Vec<Token>,
}

/// The subroutine bias for an INDEX of `count` subroutines.
pub fn subr_bias(count: usize) -> i32 {
    if count < 1240 {
        107
    } else if count < 33900 {
        1131
    } else {
        32768
    }
}

fn malformed<S: Into<String>>(msg: S) -> SubsetError {
    SubsetError::MalformedCharString(msg.into())
}

impl CharString {
    /// A charstring which draws nothing, optionally carrying a width operand.
    pub fn empty(width: Option<f64>) -> CharString {
        let mut program: Vec<Token> = width.map(Token::number).into_iter().collect();
        program.push(Token::Operator(op::ENDCHAR));
        CharString { program }
    }

    /// Encodes the program as Type 2 bytecode. Fails on integer operands
    /// outside the 16-bit range, which the format cannot express exactly.
    pub fn compile(&self) -> Result<Vec<u8>> {
        let mut out = vec![];
        for token in &self.program {
            match token {
                Token::Int(v) => encode_int(*v, &mut out)?,
                Token::Fixed(v) => {
                    out.push(255);
                    out.extend(&v.to_be_bytes());
                }
                Token::Operator(o) => {
                    if *o > 0xff {
                        out.push(op::ESCAPE as u8);
                    }
                    out.push((*o & 0xff) as u8);
                }
                Token::Mask(bytes) => out.extend(bytes),
            }
        }
        Ok(out)
    }

    /// The operand immediately preceding position `pos`, which a
    /// subroutine call consumes as its biased index.
    pub(crate) fn call_operand(&self, pos: usize) -> Result<i32> {
        match pos.checked_sub(1).and_then(|p| self.program.get(p)) {
            Some(Token::Int(i)) => Ok(*i),
            _ => Err(malformed(
                "subroutine call without a literal index operand",
            )),
        }
    }
}

fn encode_int(v: i32, out: &mut Vec<u8>) -> Result<()> {
    match v {
        -107..=107 => out.push((v + 139) as u8),
        108..=1131 => {
            let v = v - 108;
            out.push(((v >> 8) + 247) as u8);
            out.push((v & 0xff) as u8);
        }
        -1131..=-108 => {
            let v = -v - 108;
            out.push(((v >> 8) + 251) as u8);
            out.push((v & 0xff) as u8);
        }
        -32768..=32767 => {
            out.push(op::SHORTINT as u8);
            out.extend(&(v as i16).to_be_bytes());
        }
        _ => return Err(malformed(format!("operand {} out of range", v))),
    }
    Ok(())
}

/// Decodes charstring bytecode into programs.
///
/// Mask lengths depend on how many stems have been declared, which can
/// happen inside subroutines, so decoding executes calls as it goes.
/// Subroutines are decoded on their first call and cached.
pub struct Decompiler<'a> {
    global: &'a [Vec<u8>],
    local: &'a [Vec<u8>],
    /// Decoded global subroutines, by index
    pub global_subrs: Vec<Option<CharString>>,
    /// Decoded local subroutines, by index
    pub local_subrs: Vec<Option<CharString>>,
    stack: Vec<f64>,
    hint_count: usize,
    mask_bytes: usize,
}

impl<'a> Decompiler<'a> {
    /// Creates a decompiler over raw global and local subroutine data.
    pub fn new(global: &'a [Vec<u8>], local: &'a [Vec<u8>]) -> Self {
        Decompiler {
            global,
            local,
            global_subrs: vec![None; global.len()],
            local_subrs: vec![None; local.len()],
            stack: vec![],
            hint_count: 0,
            mask_bytes: 0,
        }
    }

    /// Decodes one glyph charstring.
    pub fn decompile(&mut self, data: &[u8]) -> Result<CharString> {
        self.stack.clear();
        self.hint_count = 0;
        self.mask_bytes = 0;
        self.decompile_at(data, 0)
    }

    fn count_hints(&mut self) {
        self.hint_count += self.stack.len() / 2;
        self.stack.clear();
    }

    fn call(&mut self, global: bool, depth: usize) -> Result<()> {
        let biased = self
            .stack
            .pop()
            .ok_or_else(|| malformed("subroutine call on an empty stack"))?;
        let (raw, count) = if global {
            (self.global, self.global.len())
        } else {
            (self.local, self.local.len())
        };
        let index = biased as i32 + subr_bias(count);
        let data = usize::try_from(index)
            .ok()
            .and_then(|i| raw.get(i))
            .ok_or_else(|| malformed(format!("subroutine {} out of range", index)))?;
        let decoded = self.decompile_at(data, depth + 1)?;
        let cache = if global {
            &mut self.global_subrs
        } else {
            &mut self.local_subrs
        };
        let slot = &mut cache[index as usize];
        if slot.is_none() {
            *slot = Some(decoded);
        }
        Ok(())
    }

    fn decompile_at(&mut self, data: &[u8], depth: usize) -> Result<CharString> {
        if depth > MAX_SUBR_NESTING {
            return Err(malformed("subroutines nested too deeply"));
        }
        let mut program = vec![];
        let mut i = 0;
        let byte = |i: usize| {
            data.get(i)
                .copied()
                .ok_or_else(|| malformed("unexpected end of charstring"))
        };
        while i < data.len() {
            let b0 = data[i];
            match b0 {
                32..=246 => {
                    let v = b0 as i32 - 139;
                    self.stack.push(v as f64);
                    program.push(Token::Int(v));
                    i += 1;
                }
                247..=250 => {
                    let v = (b0 as i32 - 247) * 256 + byte(i + 1)? as i32 + 108;
                    self.stack.push(v as f64);
                    program.push(Token::Int(v));
                    i += 2;
                }
                251..=254 => {
                    let v = -(b0 as i32 - 251) * 256 - byte(i + 1)? as i32 - 108;
                    self.stack.push(v as f64);
                    program.push(Token::Int(v));
                    i += 2;
                }
                28 => {
                    let v = i16::from_be_bytes([byte(i + 1)?, byte(i + 2)?]) as i32;
                    self.stack.push(v as f64);
                    program.push(Token::Int(v));
                    i += 3;
                }
                255 => {
                    let v = i32::from_be_bytes([
                        byte(i + 1)?,
                        byte(i + 2)?,
                        byte(i + 3)?,
                        byte(i + 4)?,
                    ]);
                    self.stack.push(v as f64 / 65536.0);
                    program.push(Token::Fixed(v));
                    i += 5;
                }
                12 => {
                    let operator = 0x0c00 | byte(i + 1)? as u16;
                    self.stack.clear();
                    program.push(Token::Operator(operator));
                    i += 2;
                }
                _ => {
                    let operator = b0 as u16;
                    program.push(Token::Operator(operator));
                    i += 1;
                    match operator {
                        op::CALLSUBR => self.call(false, depth)?,
                        op::CALLGSUBR => self.call(true, depth)?,
                        op::RETURN => {}
                        op::ENDCHAR => {
                            self.stack.clear();
                            break;
                        }
                        _ if is_stem(operator) => self.count_hints(),
                        _ if is_mask(operator) => {
                            if self.mask_bytes == 0 {
                                self.count_hints();
                                self.mask_bytes = (self.hint_count + 7) / 8;
                            }
                            let end = i + self.mask_bytes;
                            let mask = data
                                .get(i..end)
                                .ok_or_else(|| malformed("truncated hint mask"))?;
                            program.push(Token::Mask(mask.to_vec()));
                            self.stack.clear();
                            i = end;
                        }
                        0 | 2 | 9 | 13 | 15 | 16 | 17 => {
                            return Err(malformed(format!("reserved operator {}", operator)))
                        }
                        _ => self.stack.clear(),
                    }
                }
            }
        }
        Ok(CharString { program })
    }
}

/// Whether an [`execute`] visitor wants to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next token
    Continue,
    /// Stop the whole run
    Stop,
}

/// The subroutines visible to a glyph.
#[derive(Debug, Clone, Copy)]
pub struct Subrs<'a> {
    /// Global subroutines
    pub global: &'a [CharString],
    /// The glyph's local subroutines
    pub local: &'a [CharString],
}

/// Which subroutine INDEX a call refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SubrKind {
    /// `callgsubr`
    Global,
    /// `callsubr`
    Local,
}

impl<'a> Subrs<'a> {
    /// Resolves the subroutine called by the operator at `pos` in `cs`.
    pub fn resolve(
        &self,
        cs: &CharString,
        pos: usize,
        operator: u16,
    ) -> Result<(SubrKind, usize, &'a CharString)> {
        let (kind, list) = if operator == op::CALLGSUBR {
            (SubrKind::Global, self.global)
        } else {
            (SubrKind::Local, self.local)
        };
        let index = cs.call_operand(pos)? + subr_bias(list.len());
        usize::try_from(index)
            .ok()
            .and_then(|i| list.get(i).map(|s| (kind, i, s)))
            .ok_or_else(|| malformed(format!("subroutine {} out of range", index)))
    }
}

/// Runs a charstring with an operand stack, following subroutine calls.
///
/// `visit` sees every operator other than calls and returns together with
/// the operands on the stack at that point. The stack is then cleared.
pub fn execute(
    cs: &CharString,
    subrs: Subrs<'_>,
    visit: &mut dyn FnMut(u16, &[f64]) -> Flow,
) -> Result<Flow> {
    let mut stack = vec![];
    execute_at(cs, subrs, visit, &mut stack, 0)
}

fn execute_at(
    cs: &CharString,
    subrs: Subrs<'_>,
    visit: &mut dyn FnMut(u16, &[f64]) -> Flow,
    stack: &mut Vec<f64>,
    depth: usize,
) -> Result<Flow> {
    if depth > MAX_SUBR_NESTING {
        return Err(malformed("subroutines nested too deeply"));
    }
    for (pos, token) in cs.program.iter().enumerate() {
        match token {
            Token::Int(_) | Token::Fixed(_) => stack.extend(token.value()),
            Token::Mask(_) => {}
            Token::Operator(o @ (op::CALLSUBR | op::CALLGSUBR)) => {
                stack.pop();
                let (_, _, subr) = subrs.resolve(cs, pos, *o)?;
                if execute_at(subr, subrs, visit, stack, depth + 1)? == Flow::Stop {
                    return Ok(Flow::Stop);
                }
            }
            Token::Operator(op::RETURN) => return Ok(Flow::Continue),
            Token::Operator(o) => {
                let flow = visit(*o, stack);
                stack.clear();
                if flow == Flow::Stop || *o == op::ENDCHAR {
                    return Ok(Flow::Stop);
                }
            }
        }
    }
    Ok(Flow::Continue)
}

/// Finds the advance width operand of a glyph charstring, if it has one.
///
/// The width is an optional extra first operand of the first stack-clearing
/// operator; the result is relative to the private dictionary's
/// `nominalWidthX`.
pub fn width_operand(cs: &CharString, subrs: Subrs<'_>) -> Result<Option<f64>> {
    let mut width = None;
    execute(cs, subrs, &mut |operator, stack| {
        let has_width = match operator {
            op::HMOVETO | op::VMOVETO => stack.len() > 1,
            op::RMOVETO => stack.len() > 2,
            op::ENDCHAR => stack.len() == 1 || stack.len() == 5,
            o if is_stem(o) || is_mask(o) => stack.len() % 2 == 1,
            _ => false,
        };
        if has_width {
            width = stack.first().copied();
        }
        Flow::Stop
    })?;
    Ok(width)
}

/// Finds the base and accent codes of a `seac`-style `endchar`.
pub fn seac_components(cs: &CharString, subrs: Subrs<'_>) -> Result<Option<(u8, u8)>> {
    let mut found = None;
    execute(cs, subrs, &mut |operator, stack| {
        if operator == op::ENDCHAR && stack.len() >= 4 {
            let n = stack.len();
            found = Some((stack[n - 2] as u8, stack[n - 1] as u8));
        }
        Flow::Continue
    })?;
    Ok(found)
}
