//! Linear-time suffix array construction by induced sorting (SA-IS).
//!
//! The input gets a unique smallest sentinel appended, suffixes are split
//! into S and L types, and the leftmost S suffixes (LMS) seed two induction
//! passes. When LMS substrings repeat, their names form a reduced string that
//! is sorted recursively.

const EMPTY: usize = usize::MAX;

/// Suffix array of `text` in lexicographic order; a suffix sorts before every
/// suffix it is a proper prefix of
pub fn suffix_array(text: &[u8]) -> Vec<u32> {
    let mut symbols: Vec<usize> = text.iter().map(|&b| b as usize + 1).collect();
    symbols.push(0);
    let sa = sais(&symbols, 257);
    // The sentinel suffix always comes first
    sa[1..].iter().map(|&p| p as u32).collect()
}

/// SA-IS over `s`, whose last symbol is a unique 0 and whose symbols are below `k`
fn sais(s: &[usize], k: usize) -> Vec<usize> {
    let n = s.len();
    if n == 1 {
        return vec![0];
    }

    let mut stype = vec![false; n];
    stype[n - 1] = true;
    for i in (0..n - 1).rev() {
        stype[i] = s[i] < s[i + 1] || (s[i] == s[i + 1] && stype[i + 1]);
    }
    let mut counts = vec![0usize; k];
    for &c in s {
        counts[c] += 1;
    }
    let lms: Vec<usize> = (1..n).filter(|&i| is_lms(&stype, i)).collect();

    // Sort LMS substrings, then name them in sorted order
    let mut sa = vec![EMPTY; n];
    induce(s, &stype, &counts, &lms, &mut sa);
    let mut names = vec![EMPTY; n];
    let mut name = 0;
    let mut prev: Option<usize> = None;
    for &p in &sa {
        if !is_lms(&stype, p) {
            continue;
        }
        if prev.is_some_and(|q| !lms_substrings_equal(s, &stype, q, p)) {
            name += 1;
        }
        names[p] = name;
        prev = Some(p);
    }

    let reduced: Vec<usize> = lms.iter().map(|&p| names[p]).collect();
    let order = if name + 1 < lms.len() {
        sais(&reduced, name + 1)
    } else {
        let mut order = vec![0; lms.len()];
        for (i, &r) in reduced.iter().enumerate() {
            order[r] = i;
        }
        order
    };
    let sorted_lms: Vec<usize> = order.iter().map(|&i| lms[i]).collect();

    sa.fill(EMPTY);
    induce(s, &stype, &counts, &sorted_lms, &mut sa);
    sa
}

#[inline]
fn is_lms(stype: &[bool], i: usize) -> bool {
    i > 0 && i < stype.len() && stype[i] && !stype[i - 1]
}

/// Place `lms` at their bucket tails in the given order, then induce L and S suffixes
fn induce(s: &[usize], stype: &[bool], counts: &[usize], lms: &[usize], sa: &mut [usize]) {
    let mut tails = bucket_tails(counts);
    for &p in lms.iter().rev() {
        let c = s[p];
        tails[c] -= 1;
        sa[tails[c]] = p;
    }

    let mut heads = bucket_heads(counts);
    for i in 0..sa.len() {
        let p = sa[i];
        if p != EMPTY && p > 0 && !stype[p - 1] {
            let c = s[p - 1];
            sa[heads[c]] = p - 1;
            heads[c] += 1;
        }
    }

    let mut tails = bucket_tails(counts);
    for i in (0..sa.len()).rev() {
        let p = sa[i];
        if p != EMPTY && p > 0 && stype[p - 1] {
            let c = s[p - 1];
            tails[c] -= 1;
            sa[tails[c]] = p - 1;
        }
    }
}

fn bucket_heads(counts: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    counts
        .iter()
        .map(|&c| {
            let head = sum;
            sum += c;
            head
        })
        .collect()
}

fn bucket_tails(counts: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    counts
        .iter()
        .map(|&c| {
            sum += c;
            sum
        })
        .collect()
}

/// Whether the LMS substrings starting at `a` and `b` match in symbols and types
fn lms_substrings_equal(s: &[usize], stype: &[bool], a: usize, b: usize) -> bool {
    let sentinel = s.len() - 1;
    if a == sentinel || b == sentinel {
        return a == b;
    }
    let mut i = 0;
    loop {
        if s[a + i] != s[b + i] || stype[a + i] != stype[b + i] {
            return false;
        }
        if i > 0 {
            match (is_lms(stype, a + i), is_lms(stype, b + i)) {
                (true, true) => return true,
                (false, false) => {}
                _ => return false,
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(text: &[u8]) -> Vec<u32> {
        let mut sa: Vec<u32> = (0..text.len() as u32).collect();
        sa.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        sa
    }

    #[test]
    fn test_banana() {
        assert_eq!(suffix_array(b"banana"), vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(suffix_array(b"").is_empty());
        assert_eq!(suffix_array(b"A"), vec![0]);
    }

    #[test]
    fn test_matches_naive() {
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let random: Vec<u8> = (0..500)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                b"AACGT"[(state % 5) as usize]
            })
            .collect();
        let texts: [&[u8]; 7] = [
            b"mississippi",
            b"AAAAAAAAAAAA",
            b"ACACACACACAC",
            b"GATTACAGATTACAGATTACA",
            b"TTTTCCCCGGGGAAAATTTTCCCCGGGGAAAAT",
            b"ACGTACGTTTGACCAGTACGTACGTTTGACCAGTAAAAAAACGTACGT",
            &random,
        ];
        for text in texts {
            assert_eq!(suffix_array(text), naive(text), "{:?}", String::from_utf8_lossy(text));
        }
    }
}
