use bit_set::BitSet;

/// A rectangular boolean matrix, stored as one bitset per row.
///
/// Row and column removal are compacting: every index greater than the
/// removed one shifts down by one. Callers holding external indices into the
/// matrix must re-translate them or remove in descending order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitMatrix {
    columns: usize,
    rows: Vec<BitSet>,
}

impl BitMatrix {
    /// Creates a matrix of the given dimensions with all cells unset.
    pub fn new(rows: usize, columns: usize) -> Self {
        BitMatrix {
            columns,
            rows: vec![BitSet::with_capacity(columns); rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        self.rows[row].contains(column)
    }

    pub fn set(&mut self, row: usize, column: usize) {
        debug_assert!(column < self.columns);
        self.rows[row].insert(column);
    }

    pub fn clear(&mut self, row: usize, column: usize) {
        self.rows[row].remove(column);
    }

    /// The set of columns holding a bit in the given row.
    pub fn row(&self, row: usize) -> &BitSet {
        &self.rows[row]
    }

    /// The set of rows holding a bit in the given column.
    /// Unlike [`row`](Self::row), this builds a fresh bitset.
    pub fn column(&self, column: usize) -> BitSet {
        let mut result = BitSet::with_capacity(self.rows.len());
        for (r, row) in self.rows.iter().enumerate() {
            if row.contains(column) {
                result.insert(r);
            }
        }
        result
    }

    /// Number of set cells in the whole matrix.
    pub fn cardinality(&self) -> usize {
        self.rows.iter().map(|row| row.len()).sum()
    }

    pub fn remove_row(&mut self, row: usize) {
        self.rows.remove(row);
    }

    pub fn remove_column(&mut self, column: usize) {
        debug_assert!(column < self.columns);
        for row in &mut self.rows {
            let mut shifted = BitSet::with_capacity(self.columns - 1);
            for c in row.iter() {
                if c < column {
                    shifted.insert(c);
                } else if c > column {
                    shifted.insert(c - 1);
                }
            }
            *row = shifted;
        }
        self.columns -= 1;
    }
}

/// A square [`BitMatrix`], additionally supporting in-place transitive
/// closure.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SquareBitMatrix {
    matrix: BitMatrix,
}

impl SquareBitMatrix {
    pub fn new(size: usize) -> Self {
        SquareBitMatrix {
            matrix: BitMatrix::new(size, size),
        }
    }

    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    pub fn columns(&self) -> usize {
        self.matrix.columns()
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        self.matrix.get(row, column)
    }

    pub fn set(&mut self, row: usize, column: usize) {
        self.matrix.set(row, column)
    }

    pub fn clear(&mut self, row: usize, column: usize) {
        self.matrix.clear(row, column)
    }

    pub fn row(&self, row: usize) -> &BitSet {
        self.matrix.row(row)
    }

    pub fn column(&self, column: usize) -> BitSet {
        self.matrix.column(column)
    }

    pub fn cardinality(&self) -> usize {
        self.matrix.cardinality()
    }

    /// Removing a single row (or column) leaves the matrix rectangular;
    /// callers are expected to pair the two calls.
    pub fn remove_row(&mut self, row: usize) {
        self.matrix.remove_row(row)
    }

    pub fn remove_column(&mut self, column: usize) {
        self.matrix.remove_column(column)
    }

    /// Warshall's algorithm, in place: for each `k`, every row reaching `k`
    /// absorbs row `k`. A diagonal bit appears only if a cycle runs through
    /// that index.
    pub fn transitive_closure(&mut self) {
        let n = self.rows();
        for k in 0..n {
            let through = self.matrix.rows[k].clone();
            for i in 0..n {
                if self.matrix.rows[i].contains(k) {
                    self.matrix.rows[i].union_with(&through);
                }
            }
        }
    }
}
