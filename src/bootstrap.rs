// bootstrap.rs - Forth source evaluated on reset
//
// The kernel primitives alone are a bare machine; these definitions build
// the rest of the language on top of them. Order matters: each line may
// only use primitives and words defined on earlier lines.

pub const BOOTSTRAP: &[&str] = &[
    // Defining words
    ": VARIABLE CREATE 0 , ;",
    ": CONSTANT CREATE , DOES> @ ;",
    // Radix control
    ": DECIMAL 10 BASE ! ;",
    ": HEX 16 BASE ! ;",
    // Ticks and character literals
    ": ' BL WORD FIND DROP ;",
    ": POSTPONE ' , ; IMMEDIATE",
    ": ['] ' POSTPONE LITERAL ; IMMEDIATE",
    ": CHAR BL WORD COUNT DROP C@ ;",
    ": [CHAR] CHAR POSTPONE LITERAL ; IMMEDIATE",
    // Comments
    ": ( [CHAR] ) PARSE 2DROP ; IMMEDIATE",
    ": \\ SOURCE NIP >IN ! ; IMMEDIATE",
    // Structured control flow over the branch runtimes
    ": IF ['] (0branch) , HERE 0 , ; IMMEDIATE",
    ": THEN HERE SWAP ! ; IMMEDIATE",
    ": ELSE ['] (branch) , HERE 0 , SWAP HERE SWAP ! ; IMMEDIATE",
    ": BEGIN HERE ; IMMEDIATE",
    ": UNTIL ['] (0branch) , , ; IMMEDIATE",
    ": AGAIN ['] (branch) , , ; IMMEDIATE",
    ": WHILE ['] (0branch) , HERE 0 , SWAP ; IMMEDIATE",
    ": REPEAT ['] (branch) , , HERE SWAP ! ; IMMEDIATE",
    // Arithmetic conveniences
    ": MOD /MOD DROP ;",
    ": ABS DUP 0< IF NEGATE THEN ;",
    ": MIN 2DUP > IF SWAP THEN DROP ;",
    ": MAX 2DUP < IF SWAP THEN DROP ;",
    // Output conveniences
    ": SPACE BL EMIT ;",
    ": SPACES BEGIN DUP 0> WHILE SPACE 1- REPEAT DROP ;",
];
