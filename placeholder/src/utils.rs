use ark_std::vec::Vec;

/// A union-find forest over `0..n`, with path compression and union by size.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Create `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Return the representative of the set of `x`.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets of `x` and `y`, returning the new representative.
    pub fn union(&mut self, x: usize, y: usize) -> usize {
        let (mut a, mut b) = (self.find(x), self.find(y));
        if a == b {
            return a;
        }
        if self.size[a] < self.size[b] {
            core::mem::swap(&mut a, &mut b);
        }
        self.parent[b] = a;
        self.size[a] += self.size[b];
        a
    }

    /// Return the permutation sending every element to the next element of
    /// its set, taking the elements of each set in increasing order.
    pub fn cycles(&mut self) -> Vec<usize> {
        let n = self.parent.len();
        let mut first = vec![usize::MAX; n];
        let mut last = vec![usize::MAX; n];
        let mut next: Vec<usize> = (0..n).collect();
        for x in 0..n {
            let r = self.find(x);
            if first[r] == usize::MAX {
                first[r] = x;
            } else {
                next[last[r]] = x;
            }
            last[r] = x;
        }
        for x in 0..n {
            let r = self.find(x);
            if last[r] == x {
                next[x] = first[r];
            }
        }
        next
    }
}

#[cfg(test)]
mod test {
    use super::DisjointSet;

    #[test]
    fn cycles_follow_sets() {
        let mut set = DisjointSet::new(8);
        set.union(1, 5);
        set.union(5, 3);
        set.union(6, 2);
        set.union(3, 1);
        assert_eq!(set.find(1), set.find(3));
        assert_ne!(set.find(1), set.find(2));

        let next = set.cycles();
        assert_eq!(next, vec![0, 3, 6, 5, 4, 1, 2, 7]);

        let mut seen = next.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }
}
