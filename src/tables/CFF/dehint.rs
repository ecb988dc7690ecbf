//! Hint removal and subroutine compaction for CFF fonts.
//!
//! Dropping hints means cutting each charstring before its last stem
//! declaration (or the last call to a subroutine declaring stems), and
//! removing every hintmask. A hintmask directly after stems and operands
//! acts as an implicit `vstemhm`, so the analysis tracks whether anything
//! other than hints has been seen, following subroutine calls.
use super::charstring::{is_mask, is_stem, op, subr_bias, CharString, Subrs, SubrKind, Token};
use super::{CffFont, TAG};
use crate::error::{Result, SubsetError};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum HintStatus {
    /// Nothing but hints so far: dropping them leaves nothing.
    Empty,
    /// Only operands since the hints; more hints may follow in a caller.
    MayContinue,
    /// Drawing has started; no more hints can follow.
    Done,
}

impl Default for HintStatus {
    fn default() -> Self {
        HintStatus::Empty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct HintState {
    /// Running this charstring declares stems, directly or through calls.
    pub has_hint: bool,
    /// This charstring itself contains mask operators.
    pub has_hintmask: bool,
    /// Program position from which to keep the charstring.
    pub last_hint: usize,
    /// Position up to which the program has been checked for drawing operators.
    pub last_checked: usize,
    pub status: HintStatus,
}

/// A subroutine is identified by its INDEX (global, or the local INDEX of
/// a Private DICT) and its position in it.
type SubrId = (SubrKind, Option<usize>, usize);

fn has_operator(program: &[Token], from: usize, to: usize) -> bool {
    program
        .get(from..to.max(from).min(program.len()))
        .map_or(false, |tokens| tokens.iter().any(Token::is_operator))
}

struct HintAnalyzer<'a> {
    subrs: Subrs<'a>,
    private_key: Option<usize>,
    subr_hints: &'a mut BTreeMap<SubrId, HintState>,
}

impl<'a> HintAnalyzer<'a> {
    fn subr_id(&self, kind: SubrKind, index: usize) -> SubrId {
        match kind {
            SubrKind::Global => (kind, None, index),
            SubrKind::Local => (kind, self.private_key, index),
        }
    }

    fn analyze(&mut self, cs: &CharString, depth: usize) -> Result<HintState> {
        if depth > super::charstring::MAX_SUBR_NESTING {
            return Err(SubsetError::MalformedCharString(
                "subroutines nested too deeply".to_string(),
            ));
        }
        let program = &cs.program;
        let mut hints = HintState::default();
        let mut pos = 0;
        while pos < program.len() {
            let operator = match program[pos] {
                Token::Operator(o) => o,
                _ => {
                    pos += 1;
                    continue;
                }
            };
            // Positions below are "just after the operator".
            let index = pos + 1;
            if is_stem(operator) {
                hints.has_hint = true;
                hints.last_hint = index;
                hints.last_checked = index;
            } else if is_mask(operator) {
                hints.has_hintmask = true;
                if hints.status != HintStatus::Done && hints.has_hint {
                    if has_operator(program, hints.last_checked, pos) {
                        hints.status = HintStatus::Done;
                    } else {
                        // An implicit vstemhm; cut after the mask bytes
                        hints.last_hint = index + 1;
                        hints.status = HintStatus::Empty;
                    }
                }
                hints.last_checked = index + 1;
                pos += 1;
            } else if operator == op::CALLSUBR || operator == op::CALLGSUBR {
                let (kind, subr_index, subr) = self.subrs.resolve(cs, pos, operator)?;
                let id = self.subr_id(kind, subr_index);
                let subr_hints = match self.subr_hints.get(&id) {
                    Some(h) => *h,
                    None => {
                        let h = self.analyze(subr, depth + 1)?;
                        self.subr_hints.insert(id, h);
                        h
                    }
                };
                // An empty subroutine goes with its hints, otherwise the
                // call (and its index operand) is kept.
                let cut = if subr_hints.status == HintStatus::Empty {
                    index
                } else {
                    pos - 1
                };
                if subr_hints.has_hint {
                    // Stems after drawing has started are a font bug; ignored.
                    if hints.status != HintStatus::Done {
                        hints.has_hint = true;
                        hints.last_checked = index;
                        hints.status = subr_hints.status;
                        hints.last_hint = cut;
                    }
                } else {
                    hints.status = hints.status.max(subr_hints.status);
                    if hints.status != HintStatus::Done {
                        if has_operator(program, hints.last_checked, pos) {
                            hints.status = HintStatus::Done;
                        }
                        hints.last_checked = index;
                    }
                    if hints.status != HintStatus::Done {
                        hints.last_hint = cut;
                    }
                }
            }
            pos += 1;
        }

        if hints.status != HintStatus::Done {
            let end = program.len().saturating_sub(1);
            if let Some(rest) = program.get(hints.last_checked..end) {
                for token in rest {
                    if token.is_operator() {
                        hints.status = HintStatus::Done;
                        break;
                    }
                    hints.status = HintStatus::MayContinue;
                }
            }
            hints.last_checked = program.len();
        }
        Ok(hints)
    }
}

/// Removes hints from a charstring given its analysis. For glyph
/// charstrings, `width` is the width operand to put back in front.
fn strip_hints(cs: &mut CharString, hints: &HintState, width: Option<f64>) {
    if hints.has_hint {
        let cut = hints.last_hint.min(cs.program.len());
        cs.program.drain(..cut);
        if let Some(w) = width {
            cs.program.insert(0, Token::number(w));
        }
    }
    if hints.has_hintmask {
        let mut i = 0;
        while i < cs.program.len() {
            match cs.program[i] {
                Token::Operator(o) if is_mask(o) => {
                    let end = (i + 2).min(cs.program.len());
                    cs.program.drain(i..end);
                }
                _ => i += 1,
            }
        }
    }
}

/// Removes stem hints and hint masks from every charstring of a font,
/// including the subroutines they call.
pub(crate) fn drop_hints(font: &mut CffFont, global: &mut Vec<CharString>) -> Result<()> {
    let mut subr_hints: BTreeMap<SubrId, HintState> = BTreeMap::new();
    let mut glyph_hints = Vec::with_capacity(font.charstrings.len());
    for (gid, cs) in font.charstrings.iter().enumerate() {
        let private_key = font.private_key(gid);
        let private = font.private_dict(private_key)?;
        let subrs = Subrs {
            global,
            local: &private.subrs,
        };
        let mut analyzer = HintAnalyzer {
            subrs,
            private_key,
            subr_hints: &mut subr_hints,
        };
        let hints = analyzer.analyze(cs, 0)?;
        // The width operand is dropped with the hints unless it is put back.
        let width = if hints.has_hint {
            super::charstring::width_operand(cs, subrs)?
                .filter(|w| private.nominal_width_x + w != private.default_width_x)
        } else {
            None
        };
        glyph_hints.push((hints, width));
    }

    let mut stripped = 0;
    for (cs, (hints, width)) in font.charstrings.iter_mut().zip(glyph_hints) {
        if hints.has_hint || hints.has_hintmask {
            strip_hints(cs, &hints, width);
            stripped += 1;
        }
    }
    for ((kind, key, index), hints) in subr_hints {
        if !(hints.has_hint || hints.has_hintmask) {
            continue;
        }
        let subr = match kind {
            SubrKind::Global => global.get_mut(index),
            SubrKind::Local => font.private_dict_mut(key)?.subrs.get_mut(index),
        };
        if let Some(subr) = subr {
            strip_hints(subr, &hints, None);
            stripped += 1;
        }
    }
    log::info!("Dropped hints from {} charstrings", stripped);
    Ok(())
}

/// Used subroutines, per INDEX.
#[derive(Debug, Default)]
struct UsedSubrs {
    global: BTreeSet<usize>,
    local: BTreeMap<Option<usize>, BTreeSet<usize>>,
}

impl UsedSubrs {
    fn mark(
        &mut self,
        cs: &CharString,
        subrs: Subrs<'_>,
        private_key: Option<usize>,
        depth: usize,
    ) -> Result<()> {
        if depth > super::charstring::MAX_SUBR_NESTING {
            return Err(SubsetError::MalformedCharString(
                "subroutines nested too deeply".to_string(),
            ));
        }
        for (pos, token) in cs.program.iter().enumerate() {
            let operator = match token {
                Token::Operator(o) if *o == op::CALLSUBR || *o == op::CALLGSUBR => *o,
                _ => continue,
            };
            let (kind, index, subr) = subrs.resolve(cs, pos, operator)?;
            let new = match kind {
                SubrKind::Global => self.global.insert(index),
                SubrKind::Local => self.local.entry(private_key).or_default().insert(index),
            };
            if new {
                self.mark(subr, subrs, private_key, depth + 1)?;
            }
        }
        Ok(())
    }
}

/// Old-to-new numbering of one subroutine INDEX.
struct Renumbering {
    used: Vec<usize>,
    old_bias: i32,
    new_bias: i32,
}

impl Renumbering {
    fn new(old_count: usize, used: Option<&BTreeSet<usize>>) -> Self {
        let used: Vec<usize> = used.map(|u| u.iter().copied().collect()).unwrap_or_default();
        Renumbering {
            old_bias: subr_bias(old_count),
            new_bias: subr_bias(used.len()),
            used,
        }
    }

    fn rewrite(&self, biased: i32) -> Result<i32> {
        let old = biased + self.old_bias;
        self.used
            .iter()
            .position(|&u| u as i32 == old)
            .map(|new| new as i32 - self.new_bias)
            .ok_or_else(|| SubsetError::InvariantViolation {
                table: TAG.to_string(),
                msg: format!("call to unmarked subroutine {}", old),
            })
    }

    fn keep(&self, subrs: Vec<CharString>) -> Vec<CharString> {
        let mut subrs: Vec<Option<CharString>> = subrs.into_iter().map(Some).collect();
        self.used
            .iter()
            .filter_map(|&i| subrs.get_mut(i).and_then(Option::take))
            .collect()
    }
}

/// Rewrites the index operands of every call in `cs`. A `None` local
/// numbering leaves local calls untouched.
fn renumber_calls(
    cs: &mut CharString,
    global: &Renumbering,
    local: Option<&Renumbering>,
) -> Result<()> {
    for pos in 1..cs.program.len() {
        let numbering = match cs.program[pos] {
            Token::Operator(op::CALLGSUBR) => global,
            Token::Operator(op::CALLSUBR) => match local {
                Some(l) => l,
                None => continue,
            },
            _ => continue,
        };
        let biased = cs.call_operand(pos)?;
        cs.program[pos - 1] = Token::Int(numbering.rewrite(biased)?);
    }
    Ok(())
}

/// Removes subroutines no retained glyph calls, renumbering the calls to
/// the remaining ones.
pub(crate) fn compact_subroutines(font: &mut CffFont, global: &mut Vec<CharString>) -> Result<()> {
    let mut used = UsedSubrs::default();
    for (gid, cs) in font.charstrings.iter().enumerate() {
        let key = font.private_key(gid);
        let subrs = Subrs {
            global,
            local: &font.private_dict(key)?.subrs,
        };
        used.mark(cs, subrs, key, 0)?;
    }

    let global_numbering = Renumbering::new(global.len(), Some(&used.global));
    let mut local_numbering = BTreeMap::new();
    for key in font.private_keys() {
        let count = font.private_dict(key)?.subrs.len();
        local_numbering.insert(key, Renumbering::new(count, used.local.get(&key)));
    }

    *global = global_numbering.keep(std::mem::take(global));
    let top_local = if font.is_cid() {
        None
    } else {
        local_numbering.get(&None)
    };
    for subr in global.iter_mut() {
        if top_local.is_none() && subr.program.contains(&Token::Operator(op::CALLSUBR)) {
            log::warn!("Global subroutine of a CID-keyed font calls a local subroutine");
        }
        renumber_calls(subr, &global_numbering, top_local)?;
    }
    for (key, numbering) in &local_numbering {
        let private = font.private_dict_mut(*key)?;
        private.subrs = numbering.keep(std::mem::take(&mut private.subrs));
        for subr in private.subrs.iter_mut() {
            renumber_calls(subr, &global_numbering, Some(numbering))?;
        }
    }
    for gid in 0..font.charstrings.len() {
        let key = font.private_key(gid);
        renumber_calls(
            &mut font.charstrings[gid],
            &global_numbering,
            local_numbering.get(&key),
        )?;
    }
    log::debug!(
        "Kept {} global and {} local subroutines",
        global.len(),
        local_numbering.values().map(|n| n.used.len()).sum::<usize>()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::{PrivateDict, CFF};
    use crate::subset::{Options, SubsetTable};
    use pretty_assertions::assert_eq;

    fn int(i: i32) -> Token {
        Token::Int(i)
    }
    fn oper(o: u16) -> Token {
        Token::Operator(o)
    }
    fn cs(program: Vec<Token>) -> CharString {
        CharString { program }
    }

    fn font(charstrings: Vec<CharString>, subrs: Vec<CharString>) -> CffFont {
        CffFont {
            name: "Test".to_string(),
            charset: (0..charstrings.len()).map(|i| format!("g{}", i)).collect(),
            charstrings,
            private: PrivateDict {
                default_width_x: 500.0,
                nominal_width_x: 0.0,
                subrs,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_drop_direct_hints() {
        // 600 10 20 hstem 30 40 vstem 100 100 rmoveto 50 hlineto endchar
        let mut f = font(
            vec![cs(vec![
                int(600),
                int(10),
                int(20),
                oper(op::HSTEM),
                int(30),
                int(40),
                oper(op::VSTEM),
                int(100),
                int(100),
                oper(op::RMOVETO),
                int(50),
                oper(op::HLINETO),
                oper(op::ENDCHAR),
            ])],
            vec![],
        );
        drop_hints(&mut f, &mut vec![]).unwrap();
        assert_eq!(
            f.charstrings[0].program,
            vec![
                int(600),
                int(100),
                int(100),
                oper(op::RMOVETO),
                int(50),
                oper(op::HLINETO),
                oper(op::ENDCHAR),
            ]
        );
    }

    #[test]
    fn test_default_width_not_reinserted() {
        let mut f = font(
            vec![cs(vec![
                int(500),
                int(10),
                int(20),
                oper(op::HSTEMHM),
                int(1),
                int(2),
                oper(op::HINTMASK),
                Token::Mask(vec![0xc0]),
                int(100),
                oper(op::HMOVETO),
                oper(op::ENDCHAR),
            ])],
            vec![],
        );
        drop_hints(&mut f, &mut vec![]).unwrap();
        // The hintmask after operands was an implicit vstemhm
        assert_eq!(
            f.charstrings[0].program,
            vec![int(100), oper(op::HMOVETO), oper(op::ENDCHAR)]
        );
    }

    #[test]
    fn test_hint_only_subroutine_is_dropped() {
        let subrs = vec![
            // 0: hints only
            cs(vec![int(10), int(20), oper(op::HSTEM), oper(op::RETURN)]),
            // 1: drawing
            cs(vec![int(50), oper(op::HLINETO), oper(op::RETURN)]),
        ];
        let glyph = cs(vec![
            int(-107),
            oper(op::CALLSUBR),
            int(0),
            int(0),
            oper(op::RMOVETO),
            int(-106),
            oper(op::CALLSUBR),
            oper(op::ENDCHAR),
        ]);
        let mut table = CFF {
            fonts: vec![font(vec![glyph], subrs)],
            global_subrs: vec![],
        };
        let options = Options {
            hinting: false,
            ..Default::default()
        };
        assert!(table.prune_post_subset(&options).unwrap());
        let f = &table.fonts[0];
        assert_eq!(
            f.charstrings[0].program,
            vec![
                int(0),
                int(0),
                oper(op::RMOVETO),
                int(-107),
                oper(op::CALLSUBR),
                oper(op::ENDCHAR),
            ]
        );
        assert_eq!(f.private.subrs, vec![cs(vec![int(50), oper(op::HLINETO), oper(op::RETURN)])]);
    }

    #[test]
    fn test_shared_subroutine_keeps_path() {
        let subrs = vec![
            // 0: hints only
            cs(vec![int(10), int(20), oper(op::HSTEM), oper(op::RETURN)]),
            // 1: hints, then drawing
            cs(vec![
                int(30),
                int(40),
                oper(op::VSTEM),
                int(0),
                int(0),
                oper(op::RMOVETO),
                int(50),
                oper(op::HLINETO),
                oper(op::RETURN),
            ]),
            // 2: drawing
            cs(vec![int(9), oper(op::VLINETO), oper(op::RETURN)]),
        ];
        let glyphs = vec![
            cs(vec![
                int(600),
                int(-107),
                oper(op::CALLSUBR),
                int(-106),
                oper(op::CALLSUBR),
                oper(op::ENDCHAR),
            ]),
            cs(vec![
                int(0),
                int(0),
                oper(op::RMOVETO),
                int(-105),
                oper(op::CALLSUBR),
                oper(op::ENDCHAR),
            ]),
            cs(vec![
                int(-106),
                oper(op::CALLSUBR),
                int(-105),
                oper(op::CALLSUBR),
                oper(op::ENDCHAR),
            ]),
        ];
        let mut table = CFF {
            fonts: vec![font(glyphs, subrs)],
            global_subrs: vec![],
        };
        let options = Options {
            hinting: false,
            ..Default::default()
        };
        assert!(table.prune_post_subset(&options).unwrap());
        let f = &table.fonts[0];
        assert_eq!(
            f.private.subrs,
            vec![
                cs(vec![
                    int(0),
                    int(0),
                    oper(op::RMOVETO),
                    int(50),
                    oper(op::HLINETO),
                    oper(op::RETURN),
                ]),
                cs(vec![int(9), oper(op::VLINETO), oper(op::RETURN)]),
            ]
        );
        // Two subroutines left, so the bias is still 107
        assert_eq!(
            f.charstrings[0].program,
            vec![int(600), int(-107), oper(op::CALLSUBR), oper(op::ENDCHAR)]
        );
        assert_eq!(
            f.charstrings[1].program,
            vec![
                int(0),
                int(0),
                oper(op::RMOVETO),
                int(-106),
                oper(op::CALLSUBR),
                oper(op::ENDCHAR),
            ]
        );
        assert_eq!(
            f.charstrings[2].program,
            vec![
                int(-107),
                oper(op::CALLSUBR),
                int(-106),
                oper(op::CALLSUBR),
                oper(op::ENDCHAR),
            ]
        );
    }

    #[test]
    fn test_subroutine_compaction() {
        // Five local subroutines, of which the glyphs use 1 and 3; 3 calls
        // global subroutine 1.
        let subrs: Vec<CharString> = (0..5)
            .map(|i| {
                if i == 3 {
                    cs(vec![int(-106), oper(op::CALLGSUBR), oper(op::RETURN)])
                } else {
                    cs(vec![int(i), oper(op::HLINETO), oper(op::RETURN)])
                }
            })
            .collect();
        let mut global = vec![
            cs(vec![int(7), oper(op::VLINETO), oper(op::RETURN)]),
            cs(vec![int(8), oper(op::VLINETO), oper(op::RETURN)]),
        ];
        let mut f = font(
            vec![
                cs(vec![int(0), int(0), oper(op::RMOVETO), int(-106), oper(op::CALLSUBR), oper(op::ENDCHAR)]),
                cs(vec![int(0), int(0), oper(op::RMOVETO), int(-104), oper(op::CALLSUBR), oper(op::ENDCHAR)]),
            ],
            subrs,
        );
        compact_subroutines(&mut f, &mut global).unwrap();
        assert_eq!(f.private.subrs.len(), 2);
        assert_eq!(f.private.subrs[0].program[0], int(1));
        assert_eq!(
            f.private.subrs[1].program,
            vec![int(-107), oper(op::CALLGSUBR), oper(op::RETURN)]
        );
        assert_eq!(global, vec![cs(vec![int(8), oper(op::VLINETO), oper(op::RETURN)])]);
        assert_eq!(f.charstrings[0].program[3], int(-107));
        assert_eq!(f.charstrings[1].program[3], int(-106));
    }
}
